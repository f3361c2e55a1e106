// Composition tests: the pipeline chained end to end over fake sources:
//   provider -> scan_source -> envelope
//   provider -> scan_all -> aggregate report
// No network calls; each fake source analyzes a fixed list of texts.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FakeProvider, FakeSource, HARASSMENT_TEXTS};
use vigil::config::Config;
use vigil::models::ScanParams;
use vigil::pipeline::{scan_all, scan_source, AggregateParams, ScanOutcome, SourceRegistry};
use vigil::sources::SourceKind;

// ============================================================
// Single source
// ============================================================

#[tokio::test]
async fn successful_scan_produces_success_envelope() {
    let provider =
        FakeProvider::default().with(FakeSource::ok(SourceKind::Gnews, HARASSMENT_TEXTS));

    let outcome = scan_source(&provider, SourceKind::Gnews, &ScanParams::new("abuse", 10)).await;
    let envelope = match outcome {
        ScanOutcome::Completed(envelope) => envelope,
        other => panic!("expected a completed scan, got {other:?}"),
    };

    assert!(envelope.success);
    assert_eq!(envelope.service, "GNews");
    let data = envelope.data.expect("success carries data");
    assert_eq!(data.items_scanned, 3);
    assert_eq!(data.threats_found, 2);
    assert_eq!(data.threats_found, data.detections.len());
    assert_eq!(
        envelope.message,
        "Fresh GNews scan completed: 3 articles, 2 harassment/abuse cases found"
    );
}

#[tokio::test]
async fn detections_keep_upstream_order() {
    let provider =
        FakeProvider::default().with(FakeSource::ok(SourceKind::Newsapi, HARASSMENT_TEXTS));
    let envelope = scan_source(&provider, SourceKind::Newsapi, &ScanParams::new("q", 10))
        .await
        .into_envelope();

    let urls: Vec<String> = envelope
        .data
        .unwrap()
        .detections
        .iter()
        .map(|d| d.common().source_url.clone())
        .collect();
    assert_eq!(
        urls,
        ["https://example.com/newsapi/0", "https://example.com/newsapi/2"]
    );
}

#[tokio::test]
async fn unconfigured_source_is_unavailable() {
    let provider = FakeProvider::default();
    let outcome = scan_source(&provider, SourceKind::Twitter, &ScanParams::new("q", 10)).await;

    let envelope = match outcome {
        ScanOutcome::Unavailable(envelope) => envelope,
        other => panic!("expected unavailable, got {other:?}"),
    };
    assert!(!envelope.success);
    assert!(envelope.data.is_none());
    assert!(envelope.error.unwrap().contains("Twitter"));
}

#[tokio::test]
async fn upstream_failure_is_a_failed_envelope() {
    let provider = FakeProvider::default().with(FakeSource::failing(SourceKind::Youtube));
    let outcome = scan_source(&provider, SourceKind::Youtube, &ScanParams::new("q", 10)).await;

    let envelope = match outcome {
        ScanOutcome::Failed(envelope) => envelope,
        other => panic!("expected failed, got {other:?}"),
    };
    assert_eq!(envelope.error.as_deref(), Some("YouTube rate limit exceeded"));
}

#[tokio::test]
async fn path_like_subreddit_is_rejected() {
    let config = Config::from_lookup(|key| match key {
        "REDDIT_CLIENT_ID" | "REDDIT_CLIENT_SECRET" | "REDDIT_USERNAME" | "REDDIT_PASSWORD" => {
            Some("set".to_string())
        }
        _ => None,
    })
    .unwrap();
    let registry = SourceRegistry::new(Arc::new(config));
    let params = ScanParams::new("x/../../api/v1/me", 10);

    let envelope = match scan_source(&registry, SourceKind::Reddit, &params).await {
        ScanOutcome::Rejected(envelope) => envelope,
        other => panic!("expected rejected, got {other:?}"),
    };
    assert!(!envelope.success);
    assert!(envelope.data.is_none());
}

// ============================================================
// Aggregate
// ============================================================

#[tokio::test]
async fn partial_failure_only_counts_successful_services() {
    // reddit: unavailable, twitter: fails, youtube + gnews: succeed, newsapi: unavailable
    let provider = FakeProvider::default()
        .with(FakeSource::failing(SourceKind::Twitter))
        .with(FakeSource::ok(SourceKind::Youtube, HARASSMENT_TEXTS))
        .with(FakeSource::ok(
            SourceKind::Gnews,
            &["Street harassment survey", "Cat pictures"],
        ));

    let report = scan_all(&provider, &AggregateParams::default()).await;

    assert_eq!(report.services.len(), 5);
    assert_eq!(report.services_scanned, 2);
    assert_eq!(report.total_threats_found, 2 + 1);
    assert!(!report.services.get(SourceKind::Reddit).unwrap().success);
    assert!(!report.services.get(SourceKind::Twitter).unwrap().success);
    assert!(report.services.get(SourceKind::Youtube).unwrap().success);
    assert!(report.scan_completed >= report.scan_timestamp);
}

#[tokio::test]
async fn aggregate_order_is_fixed_regardless_of_completion_order() {
    // Reddit finishes last, NewsAPI first
    let provider = FakeProvider::default()
        .with(FakeSource::ok(SourceKind::Reddit, HARASSMENT_TEXTS).with_delay(Duration::from_millis(60)))
        .with(FakeSource::ok(SourceKind::Twitter, HARASSMENT_TEXTS).with_delay(Duration::from_millis(40)))
        .with(FakeSource::ok(SourceKind::Youtube, HARASSMENT_TEXTS).with_delay(Duration::from_millis(20)))
        .with(FakeSource::ok(SourceKind::Gnews, HARASSMENT_TEXTS))
        .with(FakeSource::ok(SourceKind::Newsapi, HARASSMENT_TEXTS));

    let report = scan_all(&provider, &AggregateParams::default()).await;

    let order: Vec<SourceKind> = report.services.iter().map(|(k, _)| *k).collect();
    assert_eq!(order, SourceKind::ALL);
    assert_eq!(report.services_scanned, 5);
    assert_eq!(report.total_threats_found, 10);

    let json = serde_json::to_string(&report).unwrap();
    let positions: Vec<usize> = ["\"reddit\"", "\"twitter\"", "\"youtube\"", "\"gnews\"", "\"newsapi\""]
        .iter()
        .map(|key| json.find(key).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn aggregate_routes_subreddit_and_query() {
    let provider = FakeProvider::default()
        .with(FakeSource::ok(SourceKind::Reddit, &[]))
        .with(FakeSource::ok(SourceKind::Gnews, &[]));
    let params = AggregateParams {
        query: "online abuse".to_string(),
        subreddit: "AskWomen".to_string(),
        limit: 5,
    };

    let report = scan_all(&provider, &params).await;

    let reddit = report.services.get(SourceKind::Reddit).unwrap();
    assert_eq!(reddit.data.as_ref().unwrap().source_info.query, "r/AskWomen");
    let gnews = report.services.get(SourceKind::Gnews).unwrap();
    assert_eq!(gnews.data.as_ref().unwrap().query, "online abuse");
}

#[tokio::test]
async fn limit_bounds_items_scanned() {
    let provider =
        FakeProvider::default().with(FakeSource::ok(SourceKind::Newsapi, HARASSMENT_TEXTS));
    let params = AggregateParams {
        limit: 1,
        ..AggregateParams::default()
    };

    let report = scan_all(&provider, &params).await;
    let data = report.services.get(SourceKind::Newsapi).unwrap().data.clone().unwrap();
    assert_eq!(data.items_scanned, 1);
}
