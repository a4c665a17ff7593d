//! Discovery walker: page through a container and keep recent, visible items.
//!
//! Paging is sequential and uses the `RequestExecutor` for every page. The
//! listing is not assumed to be time-ordered: by default every page is read.
//! `early_exit` stops after a full page whose dated items are all older than
//! the window; it saves quota on channels whose uploads list is newest-first
//! but can miss late-added items on hand-curated playlists.

mod keywords;

pub use keywords::KeywordFilter;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::api::{PageRequest, PlaylistApi, PlaylistItem, RequestExecutor, MAX_PAGE_SIZE};
use crate::retry::{classify, ApiError, ErrorKind};
use crate::sources::Source;

/// Titles the API reports for entries the viewer cannot see.
pub const SENTINEL_TITLES: [&str; 2] = ["Private video", "Deleted video"];

/// Recency cutoff, fixed once per batch so every source sees the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdWindow {
    cutoff: DateTime<Utc>,
}

impl ThresholdWindow {
    pub fn new(now: DateTime<Utc>, window: Duration) -> Self {
        Self {
            cutoff: now - window,
        }
    }

    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }

    /// Inclusive: an item published exactly at the cutoff is admitted.
    pub fn admits(&self, published_at: DateTime<Utc>) -> bool {
        published_at >= self.cutoff
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCandidate {
    pub video_id: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct DiscoveryOptions {
    pub page_size: u32,
    pub early_exit: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            page_size: 50,
            early_exit: false,
        }
    }
}

/// Why discovery for one source did not produce a result.
#[derive(Debug, Error)]
pub enum DiscoverError {
    /// Daily quota ran out mid-walk. `found` counts recent, keyword-matching items seen before the signal.
    #[error("API quota exhausted while listing {label} ({found} candidate(s) seen)")]
    QuotaExhausted { label: String, found: usize },
    /// The API rejected the credential; nothing else will work either.
    #[error("API rejected the credential while listing {label}: {source}")]
    Auth {
        label: String,
        #[source]
        source: ApiError,
    },
    /// Retries exhausted or a non-retryable failure; only this source is affected.
    #[error("listing {label} failed: {source}")]
    Failed {
        label: String,
        #[source]
        source: ApiError,
    },
    #[error("invalid keyword filter for {label}: {source}")]
    Keywords {
        label: String,
        #[source]
        source: regex::Error,
    },
}

/// Walks containers for one batch. Holds the batch-wide window; per-source state lives in `discover`.
pub struct Discovery<'a, A> {
    executor: &'a RequestExecutor<A>,
    window: ThresholdWindow,
    options: DiscoveryOptions,
}

enum Paging {
    Next(Option<String>),
    Done,
}

impl<'a, A: PlaylistApi> Discovery<'a, A> {
    pub fn new(
        executor: &'a RequestExecutor<A>,
        window: ThresholdWindow,
        options: DiscoveryOptions,
    ) -> Self {
        // The API never returns more than MAX_PAGE_SIZE items, so a larger
        // setting would make every page look short.
        let options = DiscoveryOptions {
            page_size: options.page_size.clamp(1, MAX_PAGE_SIZE),
            ..options
        };
        Self {
            executor,
            window,
            options,
        }
    }

    /// Recent, visible items of `source` that pass its keyword filter, in upstream page order.
    /// A missing container yields an empty list.
    pub fn discover(&self, source: &Source) -> Result<Vec<VideoCandidate>, DiscoverError> {
        let filter = KeywordFilter::new(&source.keywords).map_err(|e| DiscoverError::Keywords {
            label: source.label.clone(),
            source: e,
        })?;
        let recent = self.walk(source, &filter)?;
        let total = recent.len();
        let matched = filter.apply(recent);
        if !filter.is_empty() {
            tracing::debug!(
                source = %source.label,
                recent = total,
                matched = matched.len(),
                "keyword filter applied"
            );
        }
        Ok(matched)
    }

    /// Page to exhaustion (or early exit), collecting items inside the window.
    fn walk(
        &self,
        source: &Source,
        filter: &KeywordFilter,
    ) -> Result<Vec<VideoCandidate>, DiscoverError> {
        let mut found = Vec::new();
        let mut state = Paging::Next(None);
        let mut pages = 0u32;

        while let Paging::Next(page_token) = state {
            let request = PageRequest {
                playlist_id: source.container_id.clone(),
                page_token,
                max_results: self.options.page_size,
            };
            let page = match self.executor.execute(&request) {
                Ok(page) => page,
                Err(e) => return self.page_failure(source, e, filter.apply(found)),
            };
            pages += 1;

            let full_page = page.items.len() as u32 >= self.options.page_size;
            let mut dated = 0usize;
            let mut fresh = 0usize;
            for item in &page.items {
                if SENTINEL_TITLES.contains(&item.title.as_str()) {
                    continue;
                }
                let Some(published_at) = effective_published_at(item) else {
                    tracing::warn!(source = %source.label, video_id = %item.video_id, "item has no usable publish time; skipping");
                    continue;
                };
                dated += 1;
                if self.window.admits(published_at) {
                    fresh += 1;
                    found.push(VideoCandidate {
                        video_id: item.video_id.clone(),
                        title: item.title.clone(),
                        published_at,
                    });
                }
            }

            state = match page.next_page_token {
                None => Paging::Done,
                Some(_) if self.options.early_exit && full_page && dated > 0 && fresh == 0 => {
                    tracing::debug!(source = %source.label, pages, "early exit: full page older than window");
                    Paging::Done
                }
                Some(token) => Paging::Next(Some(token)),
            };
        }

        tracing::debug!(source = %source.label, pages, recent = found.len(), "walk finished");
        Ok(found)
    }

    /// `matched` holds the keyword-matching candidates from pages read before `err`.
    fn page_failure(
        &self,
        source: &Source,
        err: ApiError,
        matched: Vec<VideoCandidate>,
    ) -> Result<Vec<VideoCandidate>, DiscoverError> {
        let label = source.label.clone();
        match classify(&err) {
            ErrorKind::NotFound => {
                tracing::warn!(source = %label, container = %source.container_id, "container not found; no candidates");
                Ok(Vec::new())
            }
            ErrorKind::QuotaExhausted => Err(DiscoverError::QuotaExhausted {
                label,
                found: matched.len(),
            }),
            ErrorKind::Auth => Err(DiscoverError::Auth { label, source: err }),
            _ => Err(DiscoverError::Failed { label, source: err }),
        }
    }
}

/// `videoPublishedAt` when present and parseable, otherwise the item's `publishedAt`.
fn effective_published_at(item: &PlaylistItem) -> Option<DateTime<Utc>> {
    item.video_published_at
        .as_deref()
        .and_then(parse_timestamp)
        .or_else(|| item.published_at.as_deref().and_then(parse_timestamp))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
mod tests;
