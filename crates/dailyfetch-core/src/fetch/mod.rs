//! Download collaborator: one blocking invocation per video.
//!
//! The dispatcher depends on the `Fetcher` trait; `YtDlp` is the production
//! implementation.

mod ytdlp;

pub use ytdlp::YtDlp;

use std::path::PathBuf;
use thiserror::Error;

/// Everything one download needs. The archive path is scoped to `destination`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchJob {
    pub video_id: String,
    pub title: String,
    pub destination: PathBuf,
    pub archive: PathBuf,
}

impl FetchJob {
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// The tool ran and exited non-zero; `diagnostics` is the tail of its stderr.
    #[error("{program} exited with {status}: {diagnostics}")]
    Failed {
        program: String,
        status: String,
        diagnostics: String,
    },
}

/// Runs one download to completion, blocking the current thread.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, job: &FetchJob) -> Result<(), FetchError>;
}

impl<T: Fetcher + ?Sized> Fetcher for std::sync::Arc<T> {
    fn fetch(&self, job: &FetchJob) -> Result<(), FetchError> {
        (**self).fetch(job)
    }
}
