//! Token endpoint calls
//!
//! Handles the two token endpoint interactions:
//! 1. Authorization code exchange (completing the consent redirect)
//! 2. Token refresh (when the access token has expired)
//!
//! Both POST a form to the token endpoint with HTTP Basic client
//! authentication and share the same response shape.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::Secret;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use transport::{ApiRequest, Method, Transport};

use crate::constants::DEFAULT_TOKEN_TYPE;
use crate::error::{Error, Result};

/// The registered application: client id plus its secret.
#[derive(Debug, Clone)]
pub struct ClientIdentity {
    pub id: String,
    pub secret: Secret<String>,
}

impl ClientIdentity {
    pub fn new(id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: Secret::new(secret.into()),
        }
    }

    /// `Basic base64(client_id:client_secret)`
    pub fn basic_authorization(&self) -> String {
        let raw = format!("{}:{}", self.id, self.secret.expose());
        format!("Basic {}", STANDARD.encode(raw))
    }
}

/// Response from the token endpoint for both exchange and refresh.
///
/// `expires_in` is a delta in seconds from the response time. `scope` is the
/// space-delimited list of granted scopes. `refresh_token` is only present
/// on code exchange or when the server rotates it during a refresh.
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

fn default_token_type() -> String {
    DEFAULT_TOKEN_TYPE.to_string()
}

#[derive(Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: String,
}

/// Exchange an authorization code for tokens.
///
/// `redirect_uri` must match the one used to build the authorization URL.
pub async fn exchange_code(
    transport: &dyn Transport,
    token_endpoint: &str,
    client: &ClientIdentity,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenResponse> {
    let form = [
        ("grant_type", "authorization_code"),
        ("redirect_uri", redirect_uri),
        ("code", code),
    ];
    post_token_form(transport, token_endpoint, client, &form).await
}

/// Refresh an access token using a refresh token.
pub async fn refresh_token(
    transport: &dyn Transport,
    token_endpoint: &str,
    client: &ClientIdentity,
    refresh: &str,
) -> Result<TokenResponse> {
    let form = [("grant_type", "refresh_token"), ("refresh_token", refresh)];
    post_token_form(transport, token_endpoint, client, &form).await
}

async fn post_token_form(
    transport: &dyn Transport,
    token_endpoint: &str,
    client: &ClientIdentity,
    form: &[(&str, &str)],
) -> Result<TokenResponse> {
    let grant_type = form.first().map(|(_, v)| *v).unwrap_or_default();
    let request = ApiRequest::new(Method::POST, token_endpoint)
        .header("authorization", &client.basic_authorization())
        .map_err(|e| Error::TokenExchange(format!("building token request: {e}")))?
        .form(form);

    let response = transport.send(request).await?;
    let status = response.status;
    debug!(grant_type, status = status.as_u16(), "token endpoint responded");

    if !status.is_success() {
        warn!(grant_type, status = status.as_u16(), "token endpoint rejected request");
        if let Ok(body) = response.json::<OAuthErrorBody>() {
            return Err(Error::Rejected {
                error: body.error,
                description: body.error_description,
            });
        }
        return Err(Error::TokenExchange(format!(
            "token endpoint returned {status}: {}",
            response.text()
        )));
    }

    response
        .json::<TokenResponse>()
        .map_err(|e| Error::TokenExchange(format!("invalid token response: {e}")))
}
