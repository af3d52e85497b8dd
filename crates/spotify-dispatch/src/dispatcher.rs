//! The request pipeline
//!
//! Order per call: rate-limit gate, scope check, credential refresh, auth
//! header, transport, classification. Nothing reaches the transport while the
//! gate is closed or when a required scope is missing.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use spotify_auth::{API_BASE_URL, CredentialStore};
use tracing::{debug, warn};
use transport::{ApiRequest, ApiResponse, StatusCode, Transport};

use crate::classify::{classify_error, retry_after};
use crate::decode::{decode, decode_if_present};
use crate::error::{Error, Result};
use crate::metrics;
use crate::rate_limit::RateLimitGate;
use crate::request::{OnMissingScope, RequestSpec};

/// How a response is turned into a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// Non-429 statuses are handed back as-is.
    Status,
    /// Statuses >= 400 are classified into errors.
    Classified,
    /// Like `Classified`, but a missing scope may yield absence.
    Optional,
}

pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    credentials: Arc<CredentialStore>,
    gate: RateLimitGate,
    base_url: String,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, credentials: Arc<CredentialStore>) -> Self {
        Self {
            transport,
            credentials,
            gate: RateLimitGate::new(),
            base_url: API_BASE_URL.to_string(),
        }
    }

    /// Override the API base URL. A trailing `/` is added when missing.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn rate_limit(&self) -> &RateLimitGate {
        &self.gate
    }

    /// Issue the call and return the success response (status < 400).
    pub async fn execute(&self, spec: RequestSpec) -> Result<ApiResponse> {
        self.dispatch(spec, Shape::Classified)
            .await?
            .ok_or_else(|| Error::Transport("request produced no response".into()))
    }

    /// Issue the call and decode the body as `T`.
    pub async fn execute_json<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T> {
        let response = self.execute(spec).await?;
        decode(&response.body)
    }

    /// Issue the call for its side effect; any success body is ignored.
    pub async fn execute_empty(&self, spec: RequestSpec) -> Result<()> {
        self.execute(spec).await.map(|_| ())
    }

    /// Status check: return the response status without classifying it. A 429 still
    /// opens the rate-limit window and fails.
    pub async fn execute_status(&self, spec: RequestSpec) -> Result<StatusCode> {
        let response = self
            .dispatch(spec, Shape::Status)
            .await?
            .ok_or_else(|| Error::Transport("request produced no response".into()))?;
        Ok(response.status)
    }

    /// Decode only when the body carries `marker`. Empty bodies, bodies
    /// without the marker, and (for `OnMissingScope::Absent`) a missing scope
    /// are all `Ok(None)`.
    pub async fn execute_if_present<T: DeserializeOwned>(
        &self,
        spec: RequestSpec,
        marker: &str,
    ) -> Result<Option<T>> {
        match self.dispatch(spec, Shape::Optional).await? {
            Some(response) => decode_if_present(&response.body, marker),
            None => Ok(None),
        }
    }

    /// `Ok(None)` only when the scope policy reports absence.
    async fn dispatch(&self, spec: RequestSpec, shape: Shape) -> Result<Option<ApiResponse>> {
        if let Some(remaining) = self.gate.remaining() {
            metrics::record_rate_limited("gate");
            debug!(path = %spec.path, remaining_ms = remaining.as_millis() as u64, "rate limit window open, refusing call");
            return Err(Error::RateLimited {
                retry_after_ms: remaining.as_millis() as u64,
            });
        }

        if let Some(scope) = spec.required_scope
            && !self.credentials.has_scope(scope).await
        {
            if shape == Shape::Optional && spec.on_missing_scope == OnMissingScope::Absent {
                debug!(path = %spec.path, %scope, "scope not granted, reporting absence");
                return Ok(None);
            }
            warn!(path = %spec.path, %scope, "scope not granted");
            return Err(Error::InsufficientScope { scope });
        }

        match self.credentials.refresh().await {
            Ok(true) => metrics::record_token_refresh("success"),
            Ok(false) => {}
            Err(e) => {
                metrics::record_token_refresh("failure");
                return Err(e.into());
            }
        }

        let method = spec.method.clone();
        let path = spec.path.clone();
        let request = self.build_request(spec).await?;

        let response = self.transport.send(request).await?;
        let status = response.status;
        metrics::record_request(method.as_str(), status.as_u16());
        debug!(%method, path = %path, status = status.as_u16(), "dispatched");

        if status == StatusCode::TOO_MANY_REQUESTS {
            let wait = retry_after(&response);
            self.gate.record_limit_hit(wait);
            metrics::record_rate_limited("upstream");
            warn!(%method, path = %path, retry_after_ms = wait.as_millis() as u64, "rate limited by server");
            return Err(Error::RateLimited {
                retry_after_ms: wait.as_millis() as u64,
            });
        }

        if shape != Shape::Status && status.as_u16() >= 400 {
            let err = classify_error(&response);
            warn!(%method, path = %path, status = status.as_u16(), error = %err, "request failed");
            return Err(err);
        }

        Ok(Some(response))
    }

    async fn build_request(&self, spec: RequestSpec) -> Result<ApiRequest> {
        let url = format!("{}{}", self.base_url, spec.path.trim_start_matches('/'));
        let mut request = ApiRequest::new(spec.method, url);
        request.query = spec.query;

        if spec.requires_auth_header {
            match self.credentials.authorization().await {
                Some(authorization) => request = request.header("authorization", &authorization)?,
                None => warn!(path = %spec.path, "no access token, sending request without authorization"),
            }
        }
        for (name, value) in &spec.headers {
            request = request.header(name, value)?;
        }
        if let Some(body) = spec.body {
            request = request.json(body);
        }
        Ok(request)
    }
}
