//! Spotify OAuth credentials
//!
//! Owns everything about the access token lifecycle: the authorization URL
//! for the initial user consent, the token endpoint calls (code exchange and
//! refresh), the granted [`Scope`] set, and the [`CredentialStore`] that keeps
//! one session's credential fresh.
//!
//! Credential flow:
//! 1. Caller builds a consent URL with `authorize::build_authorization_url()`
//! 2. User approves; the redirect carries `code` and the echoed `state`
//! 3. `token::exchange_code()` trades the code for a `TokenResponse`
//! 4. `Credential::from_token_response()` turns it into a session credential
//! 5. `CredentialStore::refresh()` renews it whenever the access token expires

pub mod authorize;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod scope;
pub mod token;

pub use authorize::{build_authorization_url, generate_state};
pub use constants::*;
pub use credentials::{Credential, CredentialStore};
pub use error::{Error, Result};
pub use scope::{Scope, join_scopes, parse_scope_list};
pub use token::{ClientIdentity, TokenResponse, exchange_code, refresh_token};
