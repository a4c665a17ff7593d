//! Row types for the run ledger.

use chrono::{DateTime, Utc};

pub type RunId = i64;

/// Lifecycle of a run row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    /// Every source was visited.
    Completed,
    /// Stopped early on the daily API quota.
    QuotaExhausted,
    /// The process returned an error (e.g. rejected credentials).
    Aborted,
}

impl RunState {
    pub fn as_str(self) -> &'static str {
        match self {
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::QuotaExhausted => "quota_exhausted",
            RunState::Aborted => "aborted",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "running" => RunState::Running,
            "completed" => RunState::Completed,
            "quota_exhausted" => RunState::QuotaExhausted,
            _ => RunState::Aborted,
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of `dailyfetch history`.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub id: RunId,
    pub state: RunState,
    pub started_at: i64,
    pub finished_at: Option<i64>,
    pub cutoff: Option<DateTime<Utc>>,
    pub sources_total: i64,
    pub sources_processed: i64,
    pub sources_failed: i64,
    pub candidates_found: i64,
    pub fetch_attempts: i64,
    pub fetch_failures: i64,
    pub skipped_archived: i64,
    pub error: Option<String>,
}

/// A video whose download failed, with enough context to retry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFetch {
    pub run_id: RunId,
    pub source_label: String,
    pub container_id: String,
    pub video_id: String,
    pub title: String,
    pub detail: Option<String>,
}

impl FailedFetch {
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}
