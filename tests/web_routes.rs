// Router tests: the axum app driven with `tower::ServiceExt::oneshot`
// against fake sources. Covers status-code mapping, query defaults, the
// health check and the JSON 404.

#![cfg(feature = "web")]

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use common::{FakeProvider, FakeSource, HARASSMENT_TEXTS};
use vigil::config::Config;
use vigil::sources::SourceKind;
use vigil::web::{build_router, AppState};

fn app(provider: FakeProvider) -> axum::Router {
    let config = Config::from_lookup(|_| None).unwrap();
    build_router(AppState {
        provider: Arc::new(provider),
        config: Arc::new(config),
    })
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn successful_scan_returns_200_envelope() {
    let provider =
        FakeProvider::default().with(FakeSource::ok(SourceKind::Youtube, HARASSMENT_TEXTS));
    let (status, body) = get(app(provider), "/api/youtube/scan?query=abuse&limit=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["service"], "YouTube");
    assert_eq!(body["total_items"], 0);
    assert_eq!(body["data"]["query"], "abuse");
    assert_eq!(body["data"]["items_scanned"], 2);
    assert_eq!(body["data"]["threats_found"], 1);
    assert_eq!(body["data"]["detections"][0]["detection_type"], "news_article");
}

#[tokio::test]
async fn reddit_route_defaults_to_twox() {
    let provider = FakeProvider::default().with(FakeSource::ok(SourceKind::Reddit, &[]));
    let (status, body) = get(app(provider), "/api/reddit/scan").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["source_info"]["query"], "r/TwoXChromosomes");
    assert_eq!(body["data"]["source_info"]["focus"], "harassment_abuse");
}

#[tokio::test]
async fn unavailable_source_returns_503() {
    let (status, body) = get(app(FakeProvider::default()), "/api/twitter/scan").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["service"], "Twitter");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn failed_upstream_returns_502() {
    let provider = FakeProvider::default().with(FakeSource::failing(SourceKind::Newsapi));
    let (status, body) = get(app(provider), "/api/newsapi/scan").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "NewsAPI rate limit exceeded");
}

#[tokio::test]
async fn invalid_subreddit_returns_400_before_any_upstream_call() {
    let config = Config::from_lookup(|key| match key {
        "REDDIT_CLIENT_ID" | "REDDIT_CLIENT_SECRET" | "REDDIT_USERNAME" | "REDDIT_PASSWORD" => {
            Some("set".to_string())
        }
        _ => None,
    })
    .unwrap();
    let app = build_router(AppState::new(config));
    let (status, body) = get(app, "/api/reddit/scan?subreddit=foo%3Fsort%3Dtop%23").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["service"], "Reddit");
    assert!(body["error"].as_str().unwrap().contains("invalid subreddit"));
}

#[tokio::test]
async fn scan_all_returns_200_even_with_failures() {
    let provider = FakeProvider::default()
        .with(FakeSource::ok(SourceKind::Gnews, HARASSMENT_TEXTS))
        .with(FakeSource::failing(SourceKind::Reddit));
    let (status, body) = get(app(provider), "/api/scan/all?limit=10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["services_scanned"], 1);
    assert_eq!(body["total_threats_found"], 2);
    assert_eq!(body["services"]["reddit"]["success"], false);
    assert_eq!(body["services"]["gnews"]["success"], true);
    assert_eq!(body["services"].as_object().unwrap().len(), 5);
}

#[tokio::test]
async fn health_reports_each_source() {
    let provider = FakeProvider::default().with(FakeSource::ok(SourceKind::Gnews, &[]));
    let (status, body) = get(app(provider), "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["gnews"], "available");
    assert_eq!(body["services"]["reddit"], "unavailable");
    assert_eq!(body["endpoints"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn unknown_path_returns_json_404() {
    let (status, body) = get(app(FakeProvider::default()), "/api/myspace/scan").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found");
    assert!(body["available_endpoints"].as_array().unwrap().len() >= 7);
}
