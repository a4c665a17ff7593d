//! Discovery walker tests against a scripted page sequence.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::*;
use crate::api::{ItemPage, MAX_PAGE_SIZE};
use crate::retry::RetryPolicy;
use crate::sources::{Source, SourceKind};

struct Scripted {
    responses: Mutex<VecDeque<Result<ItemPage, ApiError>>>,
    requests: Mutex<Vec<PageRequest>>,
}

impl Scripted {
    fn new(responses: Vec<Result<ItemPage, ApiError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl PlaylistApi for Scripted {
    fn list_items(&self, request: &PageRequest) -> Result<ItemPage, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ItemPage::default()))
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
}

fn window() -> ThresholdWindow {
    ThresholdWindow::new(now(), Duration::hours(48))
}

fn executor(api: Scripted) -> RequestExecutor<Scripted> {
    RequestExecutor::new(
        api,
        RetryPolicy {
            max_attempts: 3,
            base_delay: StdDuration::ZERO,
            max_delay: StdDuration::ZERO,
        },
    )
}

fn source(keywords: &[&str]) -> Source {
    Source {
        container_id: "UUabcdefghijklmnopqrstuv".to_string(),
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
        label: "test channel".to_string(),
        kind: SourceKind::Channel,
    }
}

fn item(id: &str, title: &str, published: DateTime<Utc>) -> PlaylistItem {
    PlaylistItem {
        video_id: id.to_string(),
        title: title.to_string(),
        video_published_at: Some(published.to_rfc3339()),
        published_at: Some((published + Duration::minutes(1)).to_rfc3339()),
    }
}

fn page(items: Vec<PlaylistItem>, next: Option<&str>) -> Result<ItemPage, ApiError> {
    Ok(ItemPage {
        items,
        next_page_token: next.map(str::to_string),
    })
}

fn ids(candidates: &[VideoCandidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.video_id.as_str()).collect()
}

#[test]
fn threshold_is_inclusive() {
    let w = window();
    assert_eq!(w.cutoff(), now() - Duration::hours(48));
    assert!(w.admits(w.cutoff()));
    assert!(!w.admits(w.cutoff() - Duration::seconds(1)));
}

#[test]
fn filters_sentinels_and_stale_items_across_pages() {
    let cutoff = window().cutoff();
    let api = Scripted::new(vec![
        page(
            vec![
                item("fresh1", "New upload", now() - Duration::hours(1)),
                item("priv", "Private video", now() - Duration::hours(1)),
                item("edge", "Right at the edge", cutoff),
                item("stale1", "Old upload", cutoff - Duration::seconds(1)),
            ],
            Some("p2"),
        ),
        page(
            vec![
                item("del", "Deleted video", now()),
                item("fresh2", "Another", now() - Duration::hours(47)),
            ],
            None,
        ),
    ]);
    let exec = executor(api);
    let discovery = Discovery::new(&exec, window(), DiscoveryOptions::default());
    let out = discovery.discover(&source(&[])).unwrap();
    assert_eq!(ids(&out), vec!["fresh1", "edge", "fresh2"]);

    let requests = exec_requests(&exec);
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].page_token, None);
    assert_eq!(requests[1].page_token.as_deref(), Some("p2"));
    assert_eq!(requests[0].playlist_id, "UUabcdefghijklmnopqrstuv");
}

fn exec_requests(exec: &RequestExecutor<Scripted>) -> Vec<PageRequest> {
    exec.api().requests.lock().unwrap().clone()
}

#[test]
fn falls_back_to_item_published_at() {
    let api = Scripted::new(vec![page(
        vec![
            PlaylistItem {
                video_id: "noprimary".to_string(),
                title: "Premiere".to_string(),
                video_published_at: None,
                published_at: Some((now() - Duration::hours(2)).to_rfc3339()),
            },
            PlaylistItem {
                video_id: "garbage".to_string(),
                title: "Broken".to_string(),
                video_published_at: Some("yesterday".to_string()),
                published_at: None,
            },
        ],
        None,
    )]);
    let exec = executor(api);
    let out = Discovery::new(&exec, window(), DiscoveryOptions::default())
        .discover(&source(&[]))
        .unwrap();
    assert_eq!(ids(&out), vec!["noprimary"]);
}

#[test]
fn offset_timestamps_compare_as_instants() {
    // 2026-10-16T13:30:00+02:00 == 11:30Z, half an hour before the cutoff (12:00Z).
    let api = Scripted::new(vec![page(
        vec![
            PlaylistItem {
                video_id: "offset-stale".to_string(),
                title: "t".to_string(),
                video_published_at: Some("2026-10-16T13:30:00+02:00".to_string()),
                published_at: None,
            },
            PlaylistItem {
                video_id: "offset-fresh".to_string(),
                title: "t".to_string(),
                video_published_at: Some("2026-10-16T08:30:00-04:00".to_string()),
                published_at: None,
            },
        ],
        None,
    )]);
    let exec = executor(api);
    let out = Discovery::new(&exec, window(), DiscoveryOptions::default())
        .discover(&source(&[]))
        .unwrap();
    assert_eq!(ids(&out), vec!["offset-fresh"]);
}

#[test]
fn pages_to_exhaustion_by_default_even_after_stale_page() {
    let stale = window().cutoff() - Duration::days(3);
    let api = Scripted::new(vec![
        page(vec![item("old1", "a", stale), item("old2", "b", stale)], Some("p2")),
        page(vec![item("late", "c", now())], None),
    ]);
    let exec = executor(api);
    let opts = DiscoveryOptions {
        page_size: 2,
        early_exit: false,
    };
    let out = Discovery::new(&exec, window(), opts)
        .discover(&source(&[]))
        .unwrap();
    assert_eq!(ids(&out), vec!["late"]);
    assert_eq!(exec_requests(&exec).len(), 2);
}

#[test]
fn early_exit_stops_after_full_stale_page() {
    let stale = window().cutoff() - Duration::days(3);
    let api = Scripted::new(vec![
        page(vec![item("new", "a", now()), item("old0", "b", stale)], Some("p2")),
        page(vec![item("old1", "c", stale), item("old2", "d", stale)], Some("p3")),
        page(vec![item("never", "e", now())], None),
    ]);
    let exec = executor(api);
    let opts = DiscoveryOptions {
        page_size: 2,
        early_exit: true,
    };
    let out = Discovery::new(&exec, window(), opts)
        .discover(&source(&[]))
        .unwrap();
    assert_eq!(ids(&out), vec!["new"]);
    assert_eq!(exec_requests(&exec).len(), 2);
}

#[test]
fn early_exit_ignores_short_pages() {
    let stale = window().cutoff() - Duration::days(3);
    let api = Scripted::new(vec![
        page(vec![item("old", "a", stale)], Some("p2")),
        page(vec![item("new", "b", now())], None),
    ]);
    let exec = executor(api);
    let opts = DiscoveryOptions {
        page_size: 2,
        early_exit: true,
    };
    let out = Discovery::new(&exec, window(), opts)
        .discover(&source(&[]))
        .unwrap();
    assert_eq!(ids(&out), vec!["new"]);
}

#[test]
fn oversized_page_size_is_clamped_to_api_limit() {
    let stale = window().cutoff() - Duration::days(3);
    let full_stale: Vec<PlaylistItem> = (0..MAX_PAGE_SIZE)
        .map(|i| item(&format!("old{}", i), "x", stale))
        .collect();
    let api = Scripted::new(vec![
        page(full_stale, Some("p2")),
        page(vec![item("never", "y", now())], None),
    ]);
    let exec = executor(api);
    let opts = DiscoveryOptions {
        page_size: 200,
        early_exit: true,
    };
    let out = Discovery::new(&exec, window(), opts)
        .discover(&source(&[]))
        .unwrap();
    assert!(out.is_empty());
    let requests = exec_requests(&exec);
    assert_eq!(requests.len(), 1, "a full 50-item stale page ends the walk");
    assert_eq!(requests[0].max_results, MAX_PAGE_SIZE);
}

#[test]
fn not_found_yields_empty() {
    let api = Scripted::new(vec![Err(ApiError::http(
        404,
        Some("playlistNotFound"),
        "The playlist identified with the request's playlistId parameter cannot be found.",
    ))]);
    let exec = executor(api);
    let out = Discovery::new(&exec, window(), DiscoveryOptions::default())
        .discover(&source(&[]))
        .unwrap();
    assert!(out.is_empty());
}

#[test]
fn not_found_mid_walk_drops_partial_results() {
    let api = Scripted::new(vec![
        page(vec![item("seen", "a", now())], Some("p2")),
        Err(ApiError::http(404, Some("playlistNotFound"), "gone")),
    ]);
    let exec = executor(api);
    let out = Discovery::new(&exec, window(), DiscoveryOptions::default())
        .discover(&source(&[]))
        .unwrap();
    assert!(out.is_empty());
}

#[test]
fn quota_reports_partial_count() {
    let api = Scripted::new(vec![
        page(
            vec![item("a", "a", now()), item("b", "b", now())],
            Some("p2"),
        ),
        Err(ApiError::http(403, Some("quotaExceeded"), "quota")),
    ]);
    let exec = executor(api);
    let err = Discovery::new(&exec, window(), DiscoveryOptions::default())
        .discover(&source(&[]))
        .unwrap_err();
    match err {
        DiscoverError::QuotaExhausted { found, label } => {
            assert_eq!(found, 2);
            assert_eq!(label, "test channel");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn quota_partial_count_respects_keywords() {
    let api = Scripted::new(vec![
        page(
            vec![
                item("a", "Interview", now()),
                item("b", "Podcast", now()),
                item("c", "Weekend highlights", now()),
            ],
            Some("p2"),
        ),
        Err(ApiError::http(403, Some("quotaExceeded"), "quota")),
    ]);
    let exec = executor(api);
    let err = Discovery::new(&exec, window(), DiscoveryOptions::default())
        .discover(&source(&["highlights"]))
        .unwrap_err();
    match err {
        DiscoverError::QuotaExhausted { found, .. } => assert_eq!(found, 1),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn quota_partial_count_is_zero_when_nothing_matches() {
    let api = Scripted::new(vec![
        page(
            vec![item("a", "Interview", now()), item("b", "Podcast", now())],
            Some("p2"),
        ),
        Err(ApiError::http(403, Some("quotaExceeded"), "quota")),
    ]);
    let exec = executor(api);
    let err = Discovery::new(&exec, window(), DiscoveryOptions::default())
        .discover(&source(&["highlights"]))
        .unwrap_err();
    assert!(matches!(err, DiscoverError::QuotaExhausted { found: 0, .. }));
}

#[test]
fn transient_errors_are_retried_then_reported() {
    let api = Scripted::new(vec![
        Err(ApiError::http(500, None, "a")),
        Err(ApiError::http(500, None, "b")),
        Err(ApiError::http(500, None, "c")),
    ]);
    let exec = executor(api);
    let err = Discovery::new(&exec, window(), DiscoveryOptions::default())
        .discover(&source(&[]))
        .unwrap_err();
    assert!(matches!(
        err,
        DiscoverError::Failed {
            source: ApiError::RetryExhausted { attempts: 3, .. },
            ..
        }
    ));
}

#[test]
fn auth_rejection_is_distinct() {
    let api = Scripted::new(vec![Err(ApiError::http(400, Some("keyInvalid"), "API key not valid"))]);
    let exec = executor(api);
    let err = Discovery::new(&exec, window(), DiscoveryOptions::default())
        .discover(&source(&[]))
        .unwrap_err();
    assert!(matches!(err, DiscoverError::Auth { .. }));
}

#[test]
fn keyword_filter_narrows_after_paging() {
    let api = Scripted::new(vec![page(
        vec![
            item("a", "LIVE finals", now()),
            item("b", "Behind the scenes", now()),
            item("c", "Quarter final highlights", now()),
        ],
        None,
    )]);
    let exec = executor(api);
    let out = Discovery::new(&exec, window(), DiscoveryOptions::default())
        .discover(&source(&["live", "highlights"]))
        .unwrap();
    assert_eq!(ids(&out), vec!["a", "c"]);
}
