//! Error type for a single metadata API request.

use thiserror::Error;

/// Failure of one API request (transport, HTTP status, or undecodable body).
/// Kept structured so it can be classified before deciding retries.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("transport: {0}")]
    Curl(#[from] curl::Error),
    /// Non-2xx response; `reason` is the first `error.errors[].reason` when the body carried one.
    #[error("HTTP {status} ({}): {message}", .reason.as_deref().unwrap_or("no reason"))]
    Http {
        status: u32,
        reason: Option<String>,
        message: String,
    },
    /// 2xx response whose body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
    /// A transient failure persisted past the retry ceiling.
    #[error("gave up after {attempts} attempt(s): {last}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        last: Box<ApiError>,
    },
}

impl ApiError {
    pub fn http(status: u32, reason: Option<&str>, message: impl Into<String>) -> Self {
        ApiError::Http {
            status,
            reason: reason.map(str::to_string),
            message: message.into(),
        }
    }
}
