//! Response classification
//!
//! Maps a non-success response to a typed error by status and body shape.
//! The Web API uses two error bodies:
//! - regular errors: `{"error": {"status": 400, "message": "..."}}`
//! - OAuth errors: `{"error": "invalid_client", "error_description": "..."}`

use std::time::Duration;

use serde_json::Value;
use transport::{ApiResponse, StatusCode};

use crate::error::Error;
use crate::rate_limit::MAX_WINDOW;

/// `Retry-After` in whole seconds, capped at [`MAX_WINDOW`]. Missing or
/// unparseable means zero.
pub fn retry_after(response: &ApiResponse) -> Duration {
    response
        .header("retry-after")
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(|secs| Duration::from_secs(secs).min(MAX_WINDOW))
        .unwrap_or_default()
}

/// Classify an error response (status >= 400, other than 429).
pub fn classify_error(response: &ApiResponse) -> Error {
    let status = response.status.as_u16();
    let Ok(body) = response.json::<Value>() else {
        return unexpected(response);
    };

    if let Some(message) = body.get("message").and_then(Value::as_str) {
        return Error::RequestFailed {
            status: status_from(&body, status),
            message: message.to_string(),
        };
    }

    match body.get("error") {
        Some(Value::Object(object)) => match object.get("message").and_then(Value::as_str) {
            Some(message) => Error::RequestFailed {
                status: status_from(&body["error"], status),
                message: message.to_string(),
            },
            None => unexpected(response),
        },
        Some(Value::String(error)) => Error::AuthenticationFailed {
            error: error.clone(),
            description: body
                .get("error_description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        },
        _ => unexpected(response),
    }
}

/// Body status when it is a valid HTTP status, else the response's.
fn status_from(object: &Value, fallback: u16) -> u16 {
    object
        .get("status")
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok())
        .filter(|s| StatusCode::from_u16(*s).is_ok())
        .unwrap_or(fallback)
}

fn unexpected(response: &ApiResponse) -> Error {
    Error::Transport(format!(
        "unexpected {} response: {}",
        response.status,
        response.text()
    ))
}
