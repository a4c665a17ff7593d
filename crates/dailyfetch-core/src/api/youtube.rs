//! curl-backed client for the YouTube Data API v3.
//!
//! Each call builds a fresh `Easy` handle and blocks the current thread;
//! call from `spawn_blocking` when used from async code.

use std::time::Duration;

use super::parse;
use super::{ItemPage, PageRequest, PlaylistApi, MAX_PAGE_SIZE};
use crate::retry::ApiError;

pub struct YouTubeClient {
    base_url: String,
    api_key: String,
    connect_timeout: Duration,
    timeout: Duration,
}

impl YouTubeClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(30),
        }
    }

    /// Full request URL including the key. Never log the result.
    fn items_url(&self, request: &PageRequest) -> Result<url::Url, ApiError> {
        let endpoint = format!("{}/playlistItems", self.base_url);
        let mut params: Vec<(&str, String)> = vec![
            ("part", "snippet,contentDetails".to_string()),
            ("playlistId", request.playlist_id.clone()),
            ("maxResults", request.max_results.min(MAX_PAGE_SIZE).to_string()),
        ];
        if let Some(token) = &request.page_token {
            params.push(("pageToken", token.clone()));
        }
        params.push(("key", self.api_key.clone()));
        url::Url::parse_with_params(&endpoint, &params)
            .map_err(|e| ApiError::Decode(format!("invalid API base URL {}: {}", self.base_url, e)))
    }
}

impl PlaylistApi for YouTubeClient {
    fn list_items(&self, request: &PageRequest) -> Result<ItemPage, ApiError> {
        let url = self.items_url(request)?;
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        easy.accept_encoding("")?;

        let mut list = curl::easy::List::new();
        list.append("Accept: application/json")?;
        easy.http_headers(list)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        tracing::debug!(
            playlist = %request.playlist_id,
            page_token = request.page_token.as_deref().unwrap_or("-"),
            status = code,
            bytes = body.len(),
            "playlistItems.list"
        );
        if !(200..300).contains(&code) {
            return Err(parse::parse_error(code, &body));
        }
        parse::parse_page(&body)
    }
}
