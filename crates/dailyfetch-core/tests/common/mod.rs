//! Fakes shared by the integration tests: a scripted metadata API keyed by
//! container id and a downloader that records what it was asked to fetch.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, TimeZone, Utc};
use dailyfetch_core::api::{ItemPage, PageRequest, PlaylistApi, PlaylistItem};
use dailyfetch_core::fetch::{FetchError, FetchJob, Fetcher};
use dailyfetch_core::retry::{ApiError, RetryPolicy};
use dailyfetch_core::sources::{Source, SourceKind};

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
}

pub fn hours_ago(h: i64) -> String {
    (now() - Duration::hours(h)).to_rfc3339()
}

pub fn item(id: &str, published: &str) -> PlaylistItem {
    PlaylistItem {
        video_id: id.to_string(),
        title: format!("video {}", id),
        video_published_at: Some(published.to_string()),
        published_at: Some(published.to_string()),
    }
}

pub fn page(items: Vec<PlaylistItem>, next: Option<&str>) -> ItemPage {
    ItemPage {
        items,
        next_page_token: next.map(str::to_string),
    }
}

/// Recent items `<prefix>00`, `<prefix>01`, ... on a single page.
pub fn recent_page(prefix: &str, n: usize) -> ItemPage {
    page(
        (0..n)
            .map(|i| item(&format!("{}{:02}", prefix, i), &hours_ago(1)))
            .collect(),
        None,
    )
}

pub fn quota_error() -> ApiError {
    ApiError::http(403, Some("quotaExceeded"), "The request cannot be completed because you have exceeded your quota.")
}

pub fn channel(n: usize) -> Source {
    let id = format!("UUchannel{:015}", n);
    Source {
        container_id: id,
        keywords: Vec::new(),
        label: format!("Channel {}", n),
        kind: SourceKind::Channel,
    }
}

pub fn no_wait() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: StdDuration::ZERO,
        max_delay: StdDuration::ZERO,
    }
}

/// Serves scripted responses per container, in order. Unknown containers get a 404.
#[derive(Default)]
pub struct Catalog {
    scripts: Mutex<HashMap<String, VecDeque<Result<ItemPage, ApiError>>>>,
    requests: Mutex<Vec<PageRequest>>,
}

impl Catalog {
    pub fn with(self, container_id: &str, responses: Vec<Result<ItemPage, ApiError>>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(container_id.to_string(), responses.into());
        self
    }

    pub fn requested_containers(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for r in self.requests.lock().unwrap().iter() {
            if out.last() != Some(&r.playlist_id) {
                out.push(r.playlist_id.clone());
            }
        }
        out
    }
}

impl PlaylistApi for Catalog {
    fn list_items(&self, request: &PageRequest) -> Result<ItemPage, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(&request.playlist_id) {
            Some(queue) => queue.pop_front().unwrap_or_else(|| Ok(ItemPage::default())),
            None => Err(ApiError::http(404, Some("playlistNotFound"), "not found")),
        }
    }
}

/// Records every job. Optionally fails chosen ids and optionally appends to the
/// job's archive itself the way the real tool does.
#[derive(Default)]
pub struct RecordingFetcher {
    fail_ids: HashSet<String>,
    append_archive: bool,
    hold: StdDuration,
    jobs: Mutex<Vec<FetchJob>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl RecordingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail these ids with a non-zero exit.
    pub fn failing(mut self, ids: &[&str]) -> Self {
        self.fail_ids = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Sleep this long inside every fetch.
    pub fn holding(mut self, hold: StdDuration) -> Self {
        self.hold = hold;
        self
    }

    /// Append each fetched id to the job's archive, as yt-dlp does.
    pub fn appending(mut self, yes: bool) -> Self {
        self.append_archive = yes;
        self
    }

    pub fn jobs(&self) -> Vec<FetchJob> {
        self.jobs.lock().unwrap().clone()
    }

    pub fn fetched_ids(&self) -> Vec<String> {
        self.jobs().into_iter().map(|j| j.video_id).collect()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl Fetcher for RecordingFetcher {
    fn fetch(&self, job: &FetchJob) -> Result<(), FetchError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);
        self.jobs.lock().unwrap().push(job.clone());
        if !self.hold.is_zero() {
            std::thread::sleep(self.hold);
        }

        let result = if self.fail_ids.contains(&job.video_id) {
            Err(FetchError::Failed {
                program: "fake".to_string(),
                status: "exit status: 1".to_string(),
                diagnostics: "ERROR: Video unavailable".to_string(),
            })
        } else {
            if self.append_archive {
                let mut f = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&job.archive)
                    .unwrap();
                f.write_all(format!("youtube {}\n", job.video_id).as_bytes())
                    .unwrap();
            }
            Ok(())
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Archive lines as written, in order.
pub fn archive_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}
