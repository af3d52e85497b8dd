//! Error types for OAuth operations

/// Errors from the authorization URL builder and the token endpoint.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// The token endpoint answered with an OAuth error body
    /// (`{"error": "...", "error_description": "..."}`).
    #[error("token endpoint rejected the request: {error}: {description}")]
    Rejected { error: String, description: String },

    #[error("unknown scope: {0}")]
    InvalidScope(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<transport::Error> for Error {
    fn from(e: transport::Error) -> Self {
        match e {
            transport::Error::Decode(msg) => Error::TokenExchange(msg),
            other => Error::Http(other.to_string()),
        }
    }
}
