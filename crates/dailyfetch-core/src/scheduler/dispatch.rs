//! Fetch dispatcher: run one source's downloads with a bounded number in flight.
//!
//! Keeps up to `workers` jobs running at once; when one finishes, the next
//! queued job is started until the queue is empty. Failures are collected,
//! never propagated, and completion order is not assumed.

use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use crate::archive::ArchiveGate;
use crate::discovery::VideoCandidate;
use crate::fetch::{FetchJob, Fetcher};

/// How one candidate ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Fetched,
    Failed,
    /// Already in the destination archive; the tool was not invoked.
    Archived,
}

impl OutcomeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeStatus::Fetched => "fetched",
            OutcomeStatus::Failed => "failed",
            OutcomeStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub video_id: String,
    pub title: String,
    pub status: OutcomeStatus,
    /// Tool diagnostics for failures.
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DispatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub outcomes: Vec<FetchOutcome>,
}

impl DispatchSummary {
    pub fn attempts(&self) -> usize {
        self.succeeded + self.failed
    }

    fn push(&mut self, outcome: FetchOutcome) {
        match outcome.status {
            OutcomeStatus::Fetched => self.succeeded += 1,
            OutcomeStatus::Failed => self.failed += 1,
            OutcomeStatus::Archived => self.skipped += 1,
        }
        self.outcomes.push(outcome);
    }
}

/// Fetch `candidates` into `destination` with at most `workers` downloads in flight.
/// Returns once every job for this destination has finished.
///
/// Errors only when the destination or its archive cannot be prepared; individual
/// download failures are counted in the summary.
pub async fn dispatch<F>(
    fetcher: Arc<F>,
    destination: &Path,
    candidates: Vec<VideoCandidate>,
    workers: usize,
    label: &str,
) -> Result<DispatchSummary>
where
    F: Fetcher + 'static,
{
    let workers = workers.max(1);
    tokio::fs::create_dir_all(destination)
        .await
        .with_context(|| format!("create destination {}", destination.display()))?;

    let gate = Arc::new(ArchiveGate::for_destination(destination));
    let partition = {
        let gate = Arc::clone(&gate);
        tokio::task::spawn_blocking(move || gate.partition(candidates))
            .await
            .context("archive read task join")??
    };

    let mut summary = DispatchSummary::default();
    for c in partition.archived {
        tracing::debug!(source = %label, video_id = %c.video_id, "already archived; skipping");
        summary.push(FetchOutcome {
            video_id: c.video_id,
            title: c.title,
            status: OutcomeStatus::Archived,
            detail: None,
        });
    }

    let mut queue: VecDeque<FetchJob> = partition
        .to_fetch
        .into_iter()
        .map(|c| FetchJob {
            video_id: c.video_id,
            title: c.title,
            destination: destination.to_path_buf(),
            archive: gate.path().to_path_buf(),
        })
        .collect();

    let mut join_set = tokio::task::JoinSet::new();
    loop {
        while join_set.len() < workers {
            let Some(job) = queue.pop_front() else {
                break;
            };
            let fetcher = Arc::clone(&fetcher);
            let gate = Arc::clone(&gate);
            join_set.spawn_blocking(move || run_job(fetcher.as_ref(), &gate, job));
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        match res {
            Ok(outcome) => summary.push(outcome),
            Err(e) => {
                // Panicked job; its id is not recoverable here.
                tracing::error!(source = %label, "fetch task join: {}", e);
                summary.push(FetchOutcome {
                    video_id: String::new(),
                    title: String::new(),
                    status: OutcomeStatus::Failed,
                    detail: Some(format!("task join: {}", e)),
                });
            }
        }
    }

    Ok(summary)
}

fn run_job<F: Fetcher + ?Sized>(fetcher: &F, gate: &ArchiveGate, job: FetchJob) -> FetchOutcome {
    tracing::info!(video_id = %job.video_id, "fetching {:?}", job.title);
    match fetcher.fetch(&job) {
        Ok(()) => {
            match gate.record(&job.video_id) {
                Ok(true) => tracing::debug!(video_id = %job.video_id, "archive entry added"),
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(video_id = %job.video_id, archive = %gate.path().display(), "archive update failed: {:#}", e)
                }
            }
            FetchOutcome {
                video_id: job.video_id,
                title: job.title,
                status: OutcomeStatus::Fetched,
                detail: None,
            }
        }
        Err(e) => {
            tracing::warn!(video_id = %job.video_id, "download failed: {}", e);
            FetchOutcome {
                video_id: job.video_id,
                title: job.title,
                status: OutcomeStatus::Failed,
                detail: Some(e.to_string()),
            }
        }
    }
}
