// SPDX-License-Identifier: MIT

//! Fetcher pagination tests against a mock activity-listing endpoint.
//!
//! These verify:
//! 1. Normal termination on the first empty page, with an exact request count
//! 2. The pagination cap failing the fetch when no empty page arrives
//! 3. Run filtering and 6-field projection
//! 4. Whole-fetch failure on any non-success page

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use strava_sync::services::{ActivityFetcher, StravaClient};
use strava_sync::window::SyncWindow;
use strava_sync::SyncError;

/// Mock listing endpoint state.
struct MockApi {
    hits: AtomicUsize,
    /// Pages served in order; pages beyond the end are empty.
    pages: Vec<Vec<Value>>,
    /// Serve the first page forever (pagination never terminates).
    always_full: bool,
    /// Fail this page number with HTTP 500.
    fail_on_page: Option<usize>,
}

impl MockApi {
    fn with_pages(pages: Vec<Vec<Value>>) -> Arc<Self> {
        Arc::new(Self {
            hits: AtomicUsize::new(0),
            pages,
            always_full: false,
            fail_on_page: None,
        })
    }
}

async fn list_activities(
    State(api): State<Arc<MockApi>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Value>>, StatusCode> {
    api.hits.fetch_add(1, Ordering::SeqCst);

    let page: usize = params
        .get("page")
        .and_then(|p| p.parse().ok())
        .ok_or(StatusCode::BAD_REQUEST)?;

    if api.fail_on_page == Some(page) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    if api.always_full {
        return Ok(Json(api.pages[0].clone()));
    }
    Ok(Json(api.pages.get(page - 1).cloned().unwrap_or_default()))
}

async fn serve(api: Arc<MockApi>) -> String {
    let app = Router::new()
        .route("/api/v3/athlete/activities", get(list_activities))
        .with_state(api);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn run_json(id: i64, distance: f64) -> Value {
    json!({
        "id": id,
        "type": "Run",
        "start_date": "2024-06-13T07:00:00Z",
        "distance": distance,
        "elapsed_time": 1800,
        "moving_time": 1750,
        "total_elevation_gain": 42.0,
        "name": "Morning Run",
        "kudos_count": 3
    })
}

fn ride_json(id: i64) -> Value {
    json!({
        "id": id,
        "type": "Ride",
        "start_date": "2024-06-13T09:00:00Z",
        "distance": 30000.0,
        "elapsed_time": 5400,
        "moving_time": 5300,
        "total_elevation_gain": 300.0
    })
}

fn test_window() -> SyncWindow {
    SyncWindow::resolve(Some("2024-06-12"), Some("2024-06-16"), chrono::Utc::now()).unwrap()
}

fn fetcher_for(base_url: String, page_size: u32, max_pages: u32) -> ActivityFetcher {
    let client = StravaClient::with_base_url("id".into(), "secret".into(), base_url);
    ActivityFetcher::with_limits(client, page_size, max_pages)
}

#[tokio::test]
async fn test_fetch_unions_pages_and_stops_on_empty() {
    let api = MockApi::with_pages(vec![
        vec![run_json(1, 5000.0), run_json(2, 6000.0)],
        vec![run_json(3, 7000.0)],
        vec![run_json(4, 8000.0)],
    ]);
    let base = serve(api.clone()).await;

    let fetcher = fetcher_for(base, 2, 100);
    let runs = fetcher.fetch_runs("token", &test_window()).await.unwrap();

    // 3 non-empty pages plus the empty page that terminates the loop.
    assert_eq!(api.hits.load(Ordering::SeqCst), 4);
    assert_eq!(
        runs.iter().map(|a| a.id).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
}

#[tokio::test]
async fn test_page_cap_exhaustion_fails_the_fetch() {
    let api = Arc::new(MockApi {
        hits: AtomicUsize::new(0),
        pages: vec![vec![run_json(1, 5000.0)]],
        always_full: true,
        fail_on_page: None,
    });
    let base = serve(api.clone()).await;

    // Default cap: every one of the 100 allowed requests comes back
    // non-empty, so the fetch fails instead of trusting the data.
    let fetcher = fetcher_for(base, 100, 100);
    let err = fetcher.fetch_runs("token", &test_window()).await.unwrap_err();

    assert_eq!(api.hits.load(Ordering::SeqCst), 100);
    match err {
        SyncError::ExhaustedPagination { max_pages } => assert_eq!(max_pages, 100),
        other => panic!("expected ExhaustedPagination, got {other:?}"),
    }
}

#[tokio::test]
async fn test_lowered_page_cap_is_honored() {
    let api = Arc::new(MockApi {
        hits: AtomicUsize::new(0),
        pages: vec![vec![run_json(1, 5000.0)]],
        always_full: true,
        fail_on_page: None,
    });
    let base = serve(api.clone()).await;

    let fetcher = fetcher_for(base, 1, 5);
    let err = fetcher.fetch_runs("token", &test_window()).await.unwrap_err();

    assert_eq!(api.hits.load(Ordering::SeqCst), 5);
    assert!(matches!(err, SyncError::ExhaustedPagination { max_pages: 5 }));
}

#[tokio::test]
async fn test_only_runs_survive_with_projected_fields() {
    let api = MockApi::with_pages(vec![vec![
        run_json(10, 5000.0),
        ride_json(11),
        run_json(12, 9000.0),
    ]]);
    let base = serve(api).await;

    let fetcher = fetcher_for(base, 100, 100);
    let runs = fetcher.fetch_runs("token", &test_window()).await.unwrap();

    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].id, 10);
    assert_eq!(runs[1].id, 12);
    assert_eq!(runs[1].distance, 9000.0);
    assert_eq!(runs[0].elapsed_time, 1800.0);
    assert_eq!(runs[0].total_elevation_gain, 42.0);
}

#[tokio::test]
async fn test_failed_page_aborts_whole_fetch() {
    let api = Arc::new(MockApi {
        hits: AtomicUsize::new(0),
        pages: vec![
            vec![run_json(1, 5000.0)],
            vec![run_json(2, 6000.0)],
            vec![run_json(3, 7000.0)],
        ],
        always_full: false,
        fail_on_page: Some(2),
    });
    let base = serve(api.clone()).await;

    let fetcher = fetcher_for(base, 1, 100);
    let err = fetcher.fetch_runs("token", &test_window()).await.unwrap_err();

    // Partial results from page 1 are abandoned, not committed.
    assert_eq!(api.hits.load(Ordering::SeqCst), 2);
    match err {
        SyncError::Api(msg) => assert!(msg.contains("500"), "unexpected message: {msg}"),
        other => panic!("expected Api error, got {other:?}"),
    }
}
