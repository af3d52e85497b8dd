//! reqwest-backed transport

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Url;
use tracing::{debug, warn};

use crate::{ApiRequest, ApiResponse, Error, RequestBody, Result, Transport};

const USER_AGENT: &str = concat!("spotify-client/", env!("CARGO_PKG_VERSION"));

/// Production transport wrapping a shared `reqwest::Client`.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client with a per-request timeout and the crate user agent.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Http(format!("building HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse>> + Send + '_>> {
        Box::pin(async move {
            let url = if request.query.is_empty() {
                Url::parse(&request.url)
            } else {
                Url::parse_with_params(&request.url, &request.query)
            }
            .map_err(|e| Error::InvalidRequest(format!("url {}: {e}", request.url)))?;

            let method = request.method.clone();
            let mut builder = self
                .client
                .request(request.method, url.clone())
                .headers(request.headers);

            builder = match request.body {
                RequestBody::Json(value) => builder.json(&value),
                RequestBody::Form(pairs) => builder.form(&pairs),
                // Write endpoints reject bodyless PUT/POST without Content-Length: 0
                RequestBody::Empty if method != reqwest::Method::GET => builder.body(Vec::new()),
                RequestBody::Empty => builder,
            };

            let response = builder.send().await.map_err(|e| {
                warn!(%method, path = url.path(), error = %e, "request failed");
                Error::Http(e.to_string())
            })?;

            let status = response.status();
            let headers = response.headers().clone();
            let body = response
                .bytes()
                .await
                .map_err(|e| Error::Http(format!("reading response body: {e}")))?
                .to_vec();

            debug!(%method, path = url.path(), status = status.as_u16(), bytes = body.len(), "response received");

            Ok(ApiResponse {
                status,
                headers,
                body,
            })
        })
    }
}
