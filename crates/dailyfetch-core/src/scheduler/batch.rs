//! Batch driver: walk every source once, dispatch its new videos, total the results.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{PlaylistApi, RequestExecutor};
use crate::discovery::{DiscoverError, Discovery, DiscoveryOptions, ThresholdWindow, VideoCandidate};
use crate::fetch::Fetcher;
use crate::sources::{Source, SourceKind};

use super::dispatch::{dispatch, DispatchSummary};

/// Why the batch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Completed,
    /// Daily API quota ran out; remaining sources wait for the next run. Not an error.
    QuotaExhausted,
}

impl StopReason {
    pub fn as_str(self) -> &'static str {
        match self {
            StopReason::Completed => "completed",
            StopReason::QuotaExhausted => "quota_exhausted",
        }
    }
}

/// What happened to one source.
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub label: String,
    pub container_id: String,
    pub kind: SourceKind,
    pub candidates: Vec<VideoCandidate>,
    pub dispatch: DispatchSummary,
    /// Set when discovery or dispatch failed for this source only.
    pub error: Option<String>,
    /// Set when the quota ran out while listing this source: matching videos
    /// seen before the signal, left for the next run.
    pub quota_deferred: Option<usize>,
}

impl SourceReport {
    fn new(source: &Source) -> Self {
        Self {
            label: source.label.clone(),
            container_id: source.container_id.clone(),
            kind: source.kind,
            candidates: Vec::new(),
            dispatch: DispatchSummary::default(),
            error: None,
            quota_deferred: None,
        }
    }

    /// One-line summary for logs and the CLI.
    pub fn summary_line(&self) -> String {
        if let Some(err) = &self.error {
            return format!("[{}] {}: failed: {}", self.kind, self.label, err);
        }
        if let Some(deferred) = self.quota_deferred {
            return format!(
                "[{}] {}: API quota exhausted; {} matching video(s) left for the next run",
                self.kind, self.label, deferred
            );
        }
        if self.candidates.is_empty() {
            return format!("[{}] {}: no new videos", self.kind, self.label);
        }
        let d = &self.dispatch;
        format!(
            "[{}] {}: {} new video(s), {} fetched, {} failed, {} already archived",
            self.kind,
            self.label,
            self.candidates.len(),
            d.succeeded,
            d.failed,
            d.skipped
        )
    }
}

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub total_candidates_found: usize,
    pub total_fetch_attempts: usize,
    pub total_fetch_failures: usize,
    pub total_skipped_archived: usize,
    pub sources_processed: usize,
    pub sources_failed: usize,
    pub stop: StopReason,
    pub reports: Vec<SourceReport>,
}

impl Default for BatchResult {
    fn default() -> Self {
        Self {
            total_candidates_found: 0,
            total_fetch_attempts: 0,
            total_fetch_failures: 0,
            total_skipped_archived: 0,
            sources_processed: 0,
            sources_failed: 0,
            stop: StopReason::Completed,
            reports: Vec::new(),
        }
    }
}

impl BatchResult {
    fn absorb(&mut self, report: SourceReport) {
        self.total_candidates_found +=
            report.candidates.len() + report.quota_deferred.unwrap_or(0);
        self.total_fetch_attempts += report.dispatch.attempts();
        self.total_fetch_failures += report.dispatch.failed;
        self.total_skipped_archived += report.dispatch.skipped;
        if report.error.is_some() {
            self.sources_failed += 1;
        } else if report.quota_deferred.is_none() {
            self.sources_processed += 1;
        }
        self.reports.push(report);
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Each source downloads into `<data_dir>/<container_id>`.
    pub data_dir: PathBuf,
    pub workers: usize,
    pub window: ThresholdWindow,
    pub discovery: DiscoveryOptions,
    /// Discover and report only; nothing is downloaded.
    pub dry_run: bool,
}

/// Runs one batch. Discovery is sequential across sources to keep quota use
/// predictable; only downloads fan out.
pub struct BatchDriver<A, F> {
    executor: Arc<RequestExecutor<A>>,
    fetcher: Arc<F>,
    options: BatchOptions,
}

impl<A, F> BatchDriver<A, F>
where
    A: PlaylistApi + 'static,
    F: Fetcher + 'static,
{
    pub fn new(executor: RequestExecutor<A>, fetcher: F, options: BatchOptions) -> Self {
        Self {
            executor: Arc::new(executor),
            fetcher: Arc::new(fetcher),
            options,
        }
    }

    /// Process `sources` in order. Quota exhaustion ends the batch early with
    /// `StopReason::QuotaExhausted` and the totals so far. Only a rejected
    /// credential is returned as an error.
    pub async fn run(&self, sources: &[Source]) -> Result<BatchResult> {
        let mut result = BatchResult::default();
        tracing::info!(
            sources = sources.len(),
            cutoff = %self.options.window.cutoff(),
            workers = self.options.workers,
            dry_run = self.options.dry_run,
            "batch started"
        );

        for (idx, source) in sources.iter().enumerate() {
            let mut report = SourceReport::new(source);
            match self.discover(source).await? {
                Ok(candidates) => report.candidates = candidates,
                Err(DiscoverError::QuotaExhausted { found, .. }) => {
                    tracing::warn!(
                        source = %source.label,
                        remaining = sources.len() - idx - 1,
                        "API quota exhausted; ending batch early"
                    );
                    report.quota_deferred = Some(found);
                    tracing::info!("{}", report.summary_line());
                    result.absorb(report);
                    result.stop = StopReason::QuotaExhausted;
                    break;
                }
                Err(e @ DiscoverError::Auth { .. }) => {
                    return Err(anyhow::Error::new(e).context("aborting batch"));
                }
                Err(e) => {
                    let msg = format!("{:#}", anyhow::Error::new(e));
                    tracing::error!(source = %source.label, "{}", msg);
                    report.error = Some(msg);
                    tracing::info!("{}", report.summary_line());
                    result.absorb(report);
                    continue;
                }
            }

            if !report.candidates.is_empty() && !self.options.dry_run {
                let destination = self.options.data_dir.join(&source.container_id);
                match dispatch(
                    Arc::clone(&self.fetcher),
                    &destination,
                    report.candidates.clone(),
                    self.options.workers,
                    &source.label,
                )
                .await
                {
                    Ok(summary) => report.dispatch = summary,
                    Err(e) => {
                        tracing::error!(source = %source.label, "dispatch failed: {:#}", e);
                        report.error = Some(format!("{:#}", e));
                    }
                }
            }

            tracing::info!("{}", report.summary_line());
            result.absorb(report);
        }

        tracing::info!(
            stop = result.stop.as_str(),
            candidates = result.total_candidates_found,
            attempts = result.total_fetch_attempts,
            failures = result.total_fetch_failures,
            skipped = result.total_skipped_archived,
            "batch finished"
        );
        Ok(result)
    }

    /// Walk one source on the blocking pool (curl and backoff sleeps block).
    async fn discover(
        &self,
        source: &Source,
    ) -> Result<std::result::Result<Vec<VideoCandidate>, DiscoverError>> {
        let executor = Arc::clone(&self.executor);
        let window = self.options.window;
        let opts = self.options.discovery;
        let source = source.clone();
        tokio::task::spawn_blocking(move || {
            Discovery::new(executor.as_ref(), window, opts).discover(&source)
        })
        .await
        .context("discovery task join")
    }
}
