//! Request executor: every API call goes through the shared retry policy.

use super::{ItemPage, PageRequest, PlaylistApi};
use crate::retry::{run_with_retry, ApiError, RetryPolicy};

/// Wraps a `PlaylistApi` so transient failures are retried with backoff and
/// terminal ones (quota, not-found, auth) surface on the first occurrence.
pub struct RequestExecutor<A> {
    api: A,
    policy: RetryPolicy,
}

impl<A: PlaylistApi> RequestExecutor<A> {
    pub fn new(api: A, policy: RetryPolicy) -> Self {
        Self { api, policy }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Fetch one page. Transient failures past the ceiling become `ApiError::RetryExhausted`.
    pub fn execute(&self, request: &PageRequest) -> Result<ItemPage, ApiError> {
        run_with_retry(&self.policy, || self.api.list_items(request))
    }
}
