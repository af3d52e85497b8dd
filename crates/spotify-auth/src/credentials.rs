//! In-memory credential for one authorized session
//!
//! `Credential` is the token state; `CredentialStore` owns it behind a tokio
//! Mutex that is held across the token endpoint call, so concurrent callers
//! observing an expired token trigger exactly one refresh and then all see
//! the new token.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use common::Secret;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use transport::Transport;

use crate::constants::{DEFAULT_TOKEN_TYPE, TOKEN_ENDPOINT};
use crate::error::Result;
use crate::scope::{Scope, parse_scope_list};
use crate::token::{self, ClientIdentity, TokenResponse};

/// Longest access-token lifetime taken from an `expires_in`.
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// OAuth token state for one session.
///
/// `access_token_expiry` is an absolute instant computed from the token
/// response's `expires_in` at the moment the response arrived. `scopes` is
/// `None` until a token response has told us what was granted.
#[derive(Debug, Clone)]
pub struct Credential {
    pub client: ClientIdentity,
    pub access_token: Option<Secret<String>>,
    pub refresh_token: Option<Secret<String>>,
    pub access_token_expiry: Option<Instant>,
    pub scopes: Option<HashSet<Scope>>,
    pub token_type: String,
}

impl Credential {
    /// A credential with no tokens yet.
    pub fn new(client: ClientIdentity) -> Self {
        Self {
            client,
            access_token: None,
            refresh_token: None,
            access_token_expiry: None,
            scopes: None,
            token_type: DEFAULT_TOKEN_TYPE.to_string(),
        }
    }

    /// A credential that only knows its refresh token. The first `refresh()`
    /// fetches an access token and the granted scopes.
    pub fn from_refresh_token(client: ClientIdentity, refresh: impl Into<String>) -> Self {
        Self {
            refresh_token: Some(Secret::new(refresh.into())),
            ..Self::new(client)
        }
    }

    /// Build a credential from a code exchange response.
    pub fn from_token_response(client: ClientIdentity, response: TokenResponse) -> Self {
        let mut credential = Self::new(client);
        credential.apply(response, Instant::now());
        credential
    }

    /// True when there is no expiry or it has passed.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.access_token_expiry.is_none_or(|expiry| expiry <= now)
    }

    /// Whether `refresh()` would call the token endpoint.
    pub fn needs_refresh(&self, now: Instant) -> bool {
        self.refresh_token.is_some() && self.is_expired(now)
    }

    /// Scope check. Unknown scopes (no token response yet) fail closed.
    pub fn has_scope(&self, scope: Scope) -> bool {
        self.scopes
            .as_ref()
            .is_some_and(|granted| granted.contains(&scope))
    }

    /// `Authorization` header value, if an access token is held.
    pub fn authorization(&self) -> Option<String> {
        self.access_token
            .as_ref()
            .map(|token| format!("{} {}", self.token_type, token.expose()))
    }

    /// Replace token state from a token endpoint response.
    ///
    /// Every field is computed before any is assigned. The refresh token is
    /// only replaced when the server rotated it.
    fn apply(&mut self, response: TokenResponse, now: Instant) {
        let lifetime = Duration::from_secs(response.expires_in).min(MAX_TOKEN_LIFETIME);
        let expiry = now.checked_add(lifetime).unwrap_or(now);
        let scopes = parse_scope_list(&response.scope);
        let refresh = response.refresh_token.map(Secret::new);

        self.access_token = Some(Secret::new(response.access_token));
        self.access_token_expiry = Some(expiry);
        self.scopes = Some(scopes);
        self.token_type = response.token_type;
        if let Some(refresh) = refresh {
            self.refresh_token = Some(refresh);
        }
    }
}

/// Shared owner of one session's credential.
pub struct CredentialStore {
    state: Mutex<Credential>,
    transport: Arc<dyn Transport>,
    token_endpoint: String,
}

impl CredentialStore {
    pub fn new(credential: Credential, transport: Arc<dyn Transport>) -> Self {
        Self {
            state: Mutex::new(credential),
            transport,
            token_endpoint: TOKEN_ENDPOINT.to_string(),
        }
    }

    /// Point refreshes at a different token endpoint (tests, proxies).
    pub fn with_token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = endpoint.into();
        self
    }

    /// Refresh the access token if it has expired.
    ///
    /// Returns `Ok(true)` when the token endpoint was called and the
    /// credential replaced, `Ok(false)` when nothing needed doing (token
    /// still valid, or no refresh token to refresh with). On failure the
    /// credential keeps its previous state.
    pub async fn refresh(&self) -> Result<bool> {
        let mut credential = self.state.lock().await;

        if !credential.needs_refresh(Instant::now()) {
            return Ok(false);
        }
        let Some(refresh) = credential.refresh_token.clone() else {
            return Ok(false);
        };

        debug!(client_id = %credential.client.id, "access token expired, refreshing");
        let response = token::refresh_token(
            self.transport.as_ref(),
            &self.token_endpoint,
            &credential.client,
            refresh.expose(),
        )
        .await
        .inspect_err(|e| warn!(client_id = %credential.client.id, error = %e, "token refresh failed"))?;

        let expires_in = response.expires_in;
        let rotated = response.refresh_token.is_some();
        credential.apply(response, Instant::now());
        info!(
            client_id = %credential.client.id,
            expires_in,
            rotated,
            "access token refreshed"
        );
        Ok(true)
    }

    pub async fn has_scope(&self, scope: Scope) -> bool {
        self.state.lock().await.has_scope(scope)
    }

    pub async fn authorization(&self) -> Option<String> {
        self.state.lock().await.authorization()
    }

    /// Clone of the current credential.
    pub async fn snapshot(&self) -> Credential {
        self.state.lock().await.clone()
    }

    /// Swap in a new credential wholesale, e.g. after a fresh code exchange
    /// for a session that has no refresh token.
    pub async fn replace(&self, credential: Credential) {
        *self.state.lock().await = credential;
    }
}
