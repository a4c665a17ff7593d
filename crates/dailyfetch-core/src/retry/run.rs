//! Retry loop: run a request until success or policy says stop.

use std::time::Duration;

use super::classify;
use super::error::ApiError;
use super::policy::{RetryDecision, RetryPolicy};

/// Runs a closure until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the backoff duration then tries again.
///
/// Terminal kinds (quota, not-found, auth, other) are returned as-is on the
/// first occurrence. A transient failure that reaches the attempt ceiling is
/// wrapped in `ApiError::RetryExhausted`.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, f: F) -> Result<T, ApiError>
where
    F: FnMut() -> Result<T, ApiError>,
{
    run_with_retry_sleep(policy, f, std::thread::sleep)
}

pub(crate) fn run_with_retry_sleep<T, F, S>(
    policy: &RetryPolicy,
    mut f: F,
    mut sleep: S,
) -> Result<T, ApiError>
where
    F: FnMut() -> Result<T, ApiError>,
    S: FnMut(Duration),
{
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::RetryAfter(d) => {
                        tracing::debug!(attempt, ?kind, delay_ms = d.as_millis() as u64, "retrying API request: {}", e);
                        sleep(d);
                        attempt += 1;
                    }
                    RetryDecision::NoRetry if kind.is_transient() => {
                        return Err(ApiError::RetryExhausted {
                            attempts: attempt,
                            last: Box::new(e),
                        });
                    }
                    RetryDecision::NoRetry => return Err(e),
                }
            }
        }
    }
}
