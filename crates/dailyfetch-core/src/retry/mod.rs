//! Retry and backoff policy for metadata API requests.
//!
//! This module encapsulates error classification (transient, quota,
//! not-found, auth) and exponential backoff decisions so that discovery and
//! the batch driver share one consistent policy.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::ApiError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
