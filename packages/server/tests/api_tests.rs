//! Router-level tests with a canned portal.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use notices::testing::{login_page, notice_page, CardFixture};
use notices::{FetchMethod, FetchedPage, MockFetcher};
use serde_json::Value;
use server_core::server::{build_app, AppState};
use tempfile::TempDir;
use tower::ServiceExt;

fn two_notices() -> String {
    notice_page(&[
        CardFixture::new("Holiday Notice", "2024-05-01")
            .with_modal("m1", "School closed")
            .with_link("/a.pdf"),
        CardFixture::new("PTM", "2024-05-04"),
    ])
}

fn app(fetcher: MockFetcher, dir: &TempDir) -> Router {
    build_app(AppState::with_fetcher(fetcher, dir.path().join("db/notices.db")))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_version() {
    let dir = TempDir::new().unwrap();
    let (status, body) = get(&app(MockFetcher::new(), &dir), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn missing_cookie_is_rejected_before_fetching() {
    let dir = TempDir::new().unwrap();
    let fetcher = MockFetcher::new().without_cookie();
    let app = app(fetcher.clone(), &dir);

    for uri in ["/api/notices", "/api/notices_debug"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Missing COOKIE"));
    }
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn fetch_failure_is_bad_gateway() {
    let dir = TempDir::new().unwrap();
    let fetcher = MockFetcher::new().with_error(FetchMethod::Get, "connection refused");

    let (status, body) = get(&app(fetcher, &dir), "/api/notices").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to fetch notices");
    assert!(body["details"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn error_status_is_bad_gateway() {
    let dir = TempDir::new().unwrap();
    let page = FetchedPage::ok("https://sweedu.in/", "oops").with_status(500, None);
    let fetcher = MockFetcher::new().with_page(FetchMethod::Get, page);

    let (status, _) = get(&app(fetcher, &dir), "/api/notices").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn login_page_yields_empty_message() {
    let dir = TempDir::new().unwrap();
    let fetcher = MockFetcher::new().with_html(FetchMethod::Get, login_page());

    let (status, body) = get(&app(fetcher, &dir), "/api/notices?persist=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notices"], serde_json::json!([]));
    assert!(body["message"].as_str().unwrap().contains("expired cookie"));
    assert!(!dir.path().join("db/notices.db").exists());
}

#[tokio::test]
async fn notices_without_persistence() {
    let dir = TempDir::new().unwrap();
    let fetcher = MockFetcher::new().with_html(FetchMethod::Get, two_notices());

    let (status, body) = get(&app(fetcher, &dir), "/api/notices").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notices_count"], 2);
    assert_eq!(body["inserted_rows_estimate"], 0);
    assert_eq!(body["notices"][0]["title"], "Holiday Notice");
    assert_eq!(body["notices"][0]["description"], "School closed");
    assert_eq!(
        body["notices"][0]["download_links"],
        serde_json::json!(["https://sweedu.in/a.pdf"])
    );
    assert_eq!(body["notices"][1]["description"], "No Description Found");
    assert!(!dir.path().join("db/notices.db").exists());
}

#[tokio::test]
async fn persisted_rows_are_counted_per_request() {
    let dir = TempDir::new().unwrap();
    let fetcher = MockFetcher::new().with_html(FetchMethod::Get, two_notices());
    let app = app(fetcher, &dir);

    let (_, first) = get(&app, "/api/notices?persist=true").await;
    let (_, second) = get(&app, "/api/notices?persist=YES").await;

    assert_eq!(first["inserted_rows_estimate"], 2);
    assert_eq!(second["inserted_rows_estimate"], 0);
    assert_eq!(second["notices_count"], 2);
    assert!(second.get("inserted_rows").is_none());
    assert!(dir.path().join("db/notices.db").exists());
}

#[tokio::test]
async fn persist_failure_is_a_warning() {
    let dir = TempDir::new().unwrap();
    let fetcher = MockFetcher::new().with_html(FetchMethod::Get, two_notices());
    // The database path is an existing directory
    let app = build_app(AppState::with_fetcher(fetcher, dir.path()));

    let (status, body) = get(&app, "/api/notices?persist=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["warning"], "Failed to persist to DB");
    assert!(!body["db_error"].as_str().unwrap().is_empty());
    assert_eq!(body["notices"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn debug_probe_report() {
    let dir = TempDir::new().unwrap();
    let fetcher = MockFetcher::new()
        .with_html(FetchMethod::Get, two_notices())
        .with_html(FetchMethod::Post, login_page());

    let (status, body) = get(&app(fetcher, &dir), "/api/notices_debug?snippet_chars=20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prime_page_fetched"], true);

    let attempts = body["attempts"].as_array().unwrap();
    assert_eq!(attempts.len(), 2);

    assert_eq!(attempts[0]["phase"], "action_layer_get");
    assert_eq!(attempts[0]["method"], "get");
    assert_eq!(attempts[0]["parsed_notices"]["count"], 2);
    assert_eq!(
        attempts[0]["parsed_notices"]["titles"],
        serde_json::json!(["Holiday Notice", "PTM"])
    );
    assert_eq!(attempts[0]["hint"], Value::Null);
    assert!(attempts[0]["html_snippet"].as_str().unwrap().ends_with("..."));

    assert_eq!(attempts[1]["phase"], "action_layer_post");
    assert_eq!(attempts[1]["login_detection"]["login_like"], true);
    assert!(attempts[1]["hint"].as_str().unwrap().contains("login"));
}

#[tokio::test]
async fn debug_probe_single_method() {
    let dir = TempDir::new().unwrap();
    let fetcher = MockFetcher::new();

    let (status, body) = get(&app(fetcher.clone(), &dir), "/api/notices_debug?method=post").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attempts"].as_array().unwrap().len(), 1);
    assert_eq!(fetcher.request_count(), 1);
}

#[tokio::test]
async fn debug_rejects_bad_snippet_chars() {
    let dir = TempDir::new().unwrap();

    let (status, body) = get(
        &app(MockFetcher::new(), &dir),
        "/api/notices_debug?snippet_chars=lots",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("snippet_chars"));
}
