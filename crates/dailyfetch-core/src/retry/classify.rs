//! Classify HTTP statuses, API reason codes, and curl errors into retry policy kinds.

use crate::retry::error::ApiError;
use crate::retry::policy::ErrorKind;

/// `error.errors[].reason` values meaning the project's daily quota is spent.
const QUOTA_REASONS: &[&str] = &["quotaExceeded", "dailyLimitExceeded"];
/// Per-user / per-second limits: back off and try again.
const RATE_REASONS: &[&str] = &["rateLimitExceeded", "userRateLimitExceeded"];
/// The credential itself is unusable.
const AUTH_REASONS: &[&str] = &[
    "keyInvalid",
    "keyExpired",
    "accessNotConfigured",
    "ipRefererBlocked",
    "authError",
];

/// Classify an HTTP status and optional API reason code.
pub fn classify_http_status(status: u32, reason: Option<&str>) -> ErrorKind {
    if let Some(reason) = reason {
        if QUOTA_REASONS.contains(&reason) {
            return ErrorKind::QuotaExhausted;
        }
        if RATE_REASONS.contains(&reason) {
            return ErrorKind::Throttled;
        }
        if AUTH_REASONS.contains(&reason) {
            return ErrorKind::Auth;
        }
    }
    match status {
        401 => ErrorKind::Auth,
        404 => ErrorKind::NotFound,
        429 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(status as u16),
        _ => ErrorKind::Other,
    }
}

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify an API error into an ErrorKind. `RetryExhausted` keeps the kind of its last failure.
pub fn classify(e: &ApiError) -> ErrorKind {
    match e {
        ApiError::Curl(ce) => classify_curl_error(ce),
        ApiError::Http { status, reason, .. } => classify_http_status(*status, reason.as_deref()),
        ApiError::Decode(_) => ErrorKind::Other,
        ApiError::RetryExhausted { last, .. } => classify(last),
    }
}
