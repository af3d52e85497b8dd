//! Authorization URL for the consent step
//!
//! The user opens this URL, approves the requested scopes, and is redirected
//! to `redirect_uri` with `code` and the echoed `state`. The caller must
//! compare the echoed `state` with the one it generated before exchanging the
//! code.

use transport::Url;

use crate::error::{Error, Result};
use crate::scope::{Scope, join_scopes};

/// Random opaque `state` value: a v4 UUID without dashes.
pub fn generate_state() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Build the full authorization URL with all required OAuth parameters.
pub fn build_authorization_url(
    authorize_endpoint: &str,
    client_id: &str,
    redirect_uri: &str,
    scopes: &[Scope],
    state: &str,
) -> Result<String> {
    let scope = join_scopes(scopes);
    let url = Url::parse_with_params(
        authorize_endpoint,
        &[
            ("client_id", client_id),
            ("scope", scope.as_str()),
            ("redirect_uri", redirect_uri),
            ("state", state),
            ("response_type", "code"),
        ],
    )
    .map_err(|e| Error::InvalidUrl(format!("{authorize_endpoint}: {e}")))?;
    Ok(url.into())
}
