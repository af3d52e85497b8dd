//! Error types for dispatched requests

use spotify_auth::Scope;

/// Typed failure of a dispatched request. Absence of data is never an error;
/// it is `Ok(None)` from the optional-payload shapes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The rate-limit window is open. `retry_after_ms` is the remaining
    /// window (or the server's full `Retry-After` for the response that
    /// opened it).
    #[error("rate limited, retry after {retry_after_ms} ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("missing required scope {scope}")]
    InsufficientScope { scope: Scope },

    /// Error body with a `message` (regular Web API error object).
    #[error("request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    /// Error body with an OAuth `error` code.
    #[error("authentication failed: {error}: {description}")]
    AuthenticationFailed { error: String, description: String },

    /// Arguments rejected locally; nothing was sent.
    #[error("invalid input ({parameters}): {message}")]
    InvalidInput { parameters: String, message: String },

    /// A success response whose body did not match the expected shape.
    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    pub fn invalid_input(parameters: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidInput {
            parameters: parameters.into(),
            message: message.into(),
        }
    }
}

/// Result alias for dispatch operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<transport::Error> for Error {
    fn from(e: transport::Error) -> Self {
        match e {
            transport::Error::Decode(msg) => Error::Decode(msg),
            other => Error::Transport(other.to_string()),
        }
    }
}

impl From<spotify_auth::Error> for Error {
    fn from(e: spotify_auth::Error) -> Self {
        match e {
            spotify_auth::Error::Rejected { error, description } => {
                Error::AuthenticationFailed { error, description }
            }
            other => Error::Transport(other.to_string()),
        }
    }
}
