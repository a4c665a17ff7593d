//! Metadata API: one paginated "list items in container" call.
//!
//! `PlaylistApi` is the seam the discovery walker depends on; the curl-backed
//! `YouTubeClient` implements it against the YouTube Data API v3, and tests
//! substitute scripted pages. `RequestExecutor` wraps any implementation with
//! the shared retry policy.

mod executor;
mod parse;
mod youtube;

pub use executor::RequestExecutor;
pub use youtube::YouTubeClient;

use crate::retry::ApiError;

/// Upper bound the API accepts for `maxResults`.
pub const MAX_PAGE_SIZE: u32 = 50;

/// One page request for `playlistItems.list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub playlist_id: String,
    /// Continuation cursor from the previous page; `None` for the first page.
    pub page_token: Option<String>,
    pub max_results: u32,
}

/// One item as reported upstream. Timestamps stay raw here; discovery parses them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaylistItem {
    pub video_id: String,
    pub title: String,
    /// When the video itself was published (`contentDetails.videoPublishedAt`).
    /// Missing for private/deleted entries.
    pub video_published_at: Option<String>,
    /// When the item was added to the container (`snippet.publishedAt`).
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemPage {
    pub items: Vec<PlaylistItem>,
    pub next_page_token: Option<String>,
}

/// Paginated container listing. Implementations perform exactly one request per
/// call; retries belong to `RequestExecutor`.
pub trait PlaylistApi: Send + Sync {
    fn list_items(&self, request: &PageRequest) -> Result<ItemPage, ApiError>;
}

impl<T: PlaylistApi + ?Sized> PlaylistApi for std::sync::Arc<T> {
    fn list_items(&self, request: &PageRequest) -> Result<ItemPage, ApiError> {
        (**self).list_items(request)
    }
}
