// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /api/projects (read-only, never triggers a run)
// - GET /api/scrape   (on-demand trigger, added-count response)

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use agency_radar::api::{self, AppState};
use agency_radar::runner::Runner;
use agency_radar::scrape::sources::koto::KotoSource;
use agency_radar::store::SnapshotStore;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Build the same Router the binary uses, backed by a temp store and
/// the captured Koto work page.
fn test_router(dir: &tempfile::TempDir) -> Router {
    let html = std::fs::read_to_string("tests/fixtures/koto_work.html")
        .expect("missing tests/fixtures/koto_work.html");

    let store = SnapshotStore::new(dir.path().join("projects.json"));
    let runner = Arc::new(Runner::new(
        store.clone(),
        vec![Box::new(KotoSource::from_fixture(&html))],
        Duration::from_secs(5),
    ));
    api::router(AppState { runner, store })
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let v = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_router(&dir);

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    assert_eq!(String::from_utf8(bytes).expect("utf8").trim(), "ok");
}

#[tokio::test]
async fn api_projects_is_empty_before_any_run() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_router(&dir);

    let (status, v) = get_json(app, "/api/projects").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, serde_json::json!([]));
}

#[tokio::test]
async fn api_scrape_reports_added_then_zero_on_rerun() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_router(&dir);

    let (status, v) = get_json(app.clone(), "/api/scrape").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v.get("added").and_then(Json::as_u64), Some(2));
    assert_eq!(
        v.get("source_errors").and_then(Json::as_array).map(Vec::len),
        Some(0)
    );

    // Identical source output: nothing is new the second time.
    let (status, v) = get_json(app, "/api/scrape").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v.get("added").and_then(Json::as_u64), Some(0));
}

#[tokio::test]
async fn api_projects_serves_the_merged_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_router(&dir);

    let (status, _) = get_json(app.clone(), "/api/scrape").await;
    assert_eq!(status, StatusCode::OK);

    let (status, v) = get_json(app, "/api/projects").await;
    assert_eq!(status, StatusCode::OK);
    let arr = v.as_array().expect("projects is an array");
    assert_eq!(arr.len(), 2);
    assert!(
        arr.iter().all(|p| p.get("scraped_at").is_some()),
        "persisted records carry their ingestion timestamp"
    );
}

#[tokio::test]
async fn api_projects_surfaces_corrupt_snapshot_as_500() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("projects.json"), "{ nope").unwrap();
    let app = test_router(&dir);

    let (status, _) = get_json(app, "/api/projects").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
