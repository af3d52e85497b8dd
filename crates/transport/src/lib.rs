//! HTTP transport abstraction for the Spotify client
//!
//! Every byte that leaves the process goes through a [`Transport`]. The
//! dispatcher and the token endpoint helpers receive one explicitly at
//! construction instead of reaching for a global client, which lets tests
//! script responses and count network attempts.
//!
//! `ReqwestTransport` is the production implementation. `MockTransport`
//! (behind the `test-util` feature) replays scripted responses.

pub mod http;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use http::ReqwestTransport;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockTransport;

pub use reqwest::header;
pub use reqwest::{Method, StatusCode, Url};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;

/// Errors raised before or while talking to the network.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Result alias for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Request payload.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded` pairs (token endpoint)
    Form(Vec<(String, String)>),
}

/// A fully resolved outbound request: absolute URL, query, headers, body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Add a header, rejecting names or values that are not valid HTTP.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::InvalidRequest(format!("header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::InvalidRequest(format!("header value for {name}: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn form(mut self, pairs: &[(&str, &str)]) -> Self {
        self.body = RequestBody::Form(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    /// Header value as a string, if present and visible ASCII.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Value of the first query parameter with the given name.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A buffered response: status, headers and the raw body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Attach a header. Invalid values are dropped.
    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(HeaderName::from_static(name), value);
        }
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// True when the body carries no content (204s, empty 200s).
    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| Error::Decode(e.to_string()))
    }

    /// Body as text, lossily decoded. For log lines and error messages.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Outbound HTTP seam.
///
/// Uses `Pin<Box<dyn Future>>` return types so the dispatcher can hold an
/// `Arc<dyn Transport>`.
pub trait Transport: Send + Sync {
    /// Issue one request and buffer the full response. Non-2xx statuses are
    /// returned as responses, not errors; only I/O failures are `Err`.
    fn send(
        &self,
        request: ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse>> + Send + '_>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_collects_query_and_headers() {
        let request = ApiRequest::new(Method::GET, "https://api.spotify.com/v1/me/player")
            .query("market", "DE")
            .query("additional_types", "track,episode")
            .header("authorization", "Bearer at_1")
            .unwrap();

        assert_eq!(request.query_value("market"), Some("DE"));
        assert_eq!(request.query_value("additional_types"), Some("track,episode"));
        assert_eq!(request.query_value("missing"), None);
        assert_eq!(request.header_value("authorization"), Some("Bearer at_1"));
    }

    #[test]
    fn request_builder_rejects_invalid_header_value() {
        let result = ApiRequest::new(Method::GET, "https://example.com").header("x-bad", "a\nb");
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn form_body_keeps_pair_order() {
        let request = ApiRequest::new(Method::POST, "https://accounts.spotify.com/api/token")
            .form(&[("grant_type", "refresh_token"), ("refresh_token", "rt")]);
        match request.body {
            RequestBody::Form(pairs) => {
                assert_eq!(pairs[0], ("grant_type".into(), "refresh_token".into()));
                assert_eq!(pairs[1], ("refresh_token".into(), "rt".into()));
            }
            other => panic!("expected form body, got {other:?}"),
        }
    }

    #[test]
    fn response_helpers() {
        let response = ApiResponse::new(StatusCode::TOO_MANY_REQUESTS, "")
            .with_header("retry-after", "2");
        assert_eq!(response.header("retry-after"), Some("2"));
        assert_eq!(response.header("Retry-After"), Some("2"));
        assert!(response.is_empty());

        let response = ApiResponse::new(StatusCode::OK, r#"{"is_playing":true}"#);
        assert!(!response.is_empty());
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["is_playing"], true);
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        let response = ApiResponse::new(StatusCode::OK, "<html>");
        let err = response.json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, Error::Decode(_)), "got {err:?}");
    }
}
