// SPDX-License-Identifier: MIT

//! Token provider tests against a mock OAuth endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Form, Json, Router};
use serde_json::{json, Value};
use tokio::sync::Mutex;

use strava_sync::services::StravaClient;
use strava_sync::SyncError;

/// Records the last form body and replies with a canned status.
struct MockOauth {
    status: StatusCode,
    last_form: Mutex<Option<HashMap<String, String>>>,
}

async fn token_endpoint(
    State(oauth): State<Arc<MockOauth>>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    *oauth.last_form.lock().await = Some(form);

    if !oauth.status.is_success() {
        return Err(oauth.status);
    }
    Ok(Json(json!({
        "access_token": "fresh-access-token",
        "refresh_token": "rotated-refresh-token",
        "expires_at": 1_900_000_000
    })))
}

async fn serve(oauth: Arc<MockOauth>) -> String {
    let app = Router::new()
        .route("/oauth/token", post(token_endpoint))
        .with_state(oauth);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_refresh_token_posts_grant_and_returns_access_token() {
    let oauth = Arc::new(MockOauth {
        status: StatusCode::OK,
        last_form: Mutex::new(None),
    });
    let base = serve(oauth.clone()).await;

    let client = StravaClient::with_base_url("the-id".into(), "the-secret".into(), base);
    let tokens = client.refresh_token("the-refresh-token").await.unwrap();

    assert_eq!(tokens.access_token, "fresh-access-token");
    assert_eq!(tokens.expires_at, 1_900_000_000);

    let form = oauth.last_form.lock().await.clone().unwrap();
    assert_eq!(form.get("grant_type").map(String::as_str), Some("refresh_token"));
    assert_eq!(form.get("client_id").map(String::as_str), Some("the-id"));
    assert_eq!(form.get("client_secret").map(String::as_str), Some("the-secret"));
    assert_eq!(
        form.get("refresh_token").map(String::as_str),
        Some("the-refresh-token")
    );
}

#[tokio::test]
async fn test_non_success_status_is_auth_error() {
    let oauth = Arc::new(MockOauth {
        status: StatusCode::UNAUTHORIZED,
        last_form: Mutex::new(None),
    });
    let base = serve(oauth).await;

    let client = StravaClient::with_base_url("id".into(), "bad-secret".into(), base);
    let err = client.refresh_token("stale").await.unwrap_err();

    match err {
        SyncError::Auth(msg) => assert!(msg.contains("401"), "unexpected message: {msg}"),
        other => panic!("expected Auth error, got {other:?}"),
    }
}
