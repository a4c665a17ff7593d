//! Decode `playlistItems.list` response bodies and API error bodies.

use serde::Deserialize;

use super::{ItemPage, PlaylistItem};
use crate::retry::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    items: Vec<RawItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    snippet: Option<Snippet>,
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: Option<String>,
    published_at: Option<String>,
    resource_id: Option<ResourceId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentDetails {
    video_id: Option<String>,
    video_published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}

/// Parse a 2xx body into a page. Items without a video id are dropped.
pub(crate) fn parse_page(body: &[u8]) -> Result<ItemPage, ApiError> {
    let resp: ListResponse =
        serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))?;

    let items = resp
        .items
        .into_iter()
        .filter_map(|raw| {
            let details = raw.content_details;
            let snippet = raw.snippet;
            let video_id = details
                .as_ref()
                .and_then(|d| d.video_id.clone())
                .or_else(|| {
                    snippet
                        .as_ref()
                        .and_then(|s| s.resource_id.as_ref())
                        .and_then(|r| r.video_id.clone())
                })?;
            Some(PlaylistItem {
                video_id,
                title: snippet
                    .as_ref()
                    .and_then(|s| s.title.clone())
                    .unwrap_or_default(),
                video_published_at: details.and_then(|d| d.video_published_at),
                published_at: snippet.and_then(|s| s.published_at),
            })
        })
        .collect();

    Ok(ItemPage {
        items,
        next_page_token: resp.next_page_token.filter(|t| !t.is_empty()),
    })
}

/// Build an `ApiError::Http` from a non-2xx status and whatever body came with it.
pub(crate) fn parse_error(status: u32, body: &[u8]) -> ApiError {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(env) => {
            let reason = env.error.errors.into_iter().find_map(|d| d.reason);
            ApiError::Http {
                status,
                reason,
                message: env.error.message,
            }
        }
        Err(_) => ApiError::Http {
            status,
            reason: None,
            message: String::from_utf8_lossy(body).chars().take(200).collect(),
        },
    }
}
