// Scan handlers.
//
// GET /api/{source}/scan   one source, envelope back
// GET /api/scan/all        every source, aggregate report back
//
// Missing or unparseable `limit` falls back to the default rather than
// rejecting the request.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::models::ScanParams;
use crate::pipeline::aggregate::{self, AggregateParams};
use crate::pipeline::{scan_source, ScanOutcome};
use crate::sources::SourceKind;
use crate::web::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct ScanQuery {
    pub query: Option<String>,
    pub subreddit: Option<String>,
    /// Kept as text so a bad value falls back instead of rejecting
    pub limit: Option<String>,
}

impl ScanQuery {
    fn limit_or(&self, default: u32) -> u32 {
        self.limit
            .as_deref()
            .and_then(|l| l.trim().parse().ok())
            .unwrap_or(default)
    }

    fn non_empty(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    /// Resolve per-source parameters against the configured defaults.
    pub fn scan_params(&self, kind: SourceKind, default_limit: u32) -> ScanParams {
        let subject = if kind.takes_subreddit() {
            Self::non_empty(&self.subreddit)
        } else {
            Self::non_empty(&self.query)
        };
        ScanParams::new(
            subject.unwrap_or(kind.default_subject()),
            self.limit_or(default_limit),
        )
    }

    pub fn aggregate_params(&self) -> AggregateParams {
        AggregateParams {
            query: Self::non_empty(&self.query)
                .unwrap_or(aggregate::DEFAULT_QUERY)
                .to_string(),
            subreddit: Self::non_empty(&self.subreddit)
                .unwrap_or(aggregate::DEFAULT_SUBREDDIT)
                .to_string(),
            limit: self.limit_or(aggregate::DEFAULT_LIMIT),
        }
    }
}

/// GET /api/{source}/scan
pub async fn scan_one(
    State(state): State<AppState>,
    Query(query): Query<ScanQuery>,
    kind: SourceKind,
) -> Response {
    let params = query.scan_params(kind, state.config.default_limit(kind));

    let (status, envelope) = match scan_source(state.provider.as_ref(), kind, &params).await {
        ScanOutcome::Completed(e) => (StatusCode::OK, e),
        ScanOutcome::Failed(e) => (StatusCode::BAD_GATEWAY, e),
        ScanOutcome::Unavailable(e) => (StatusCode::SERVICE_UNAVAILABLE, e),
        ScanOutcome::Rejected(e) => (StatusCode::BAD_REQUEST, e),
    };
    (status, Json(envelope)).into_response()
}

/// GET /api/scan/all
pub async fn scan_all(
    State(state): State<AppState>,
    Query(query): Query<ScanQuery>,
) -> Response {
    let params = query.aggregate_params();
    let report = aggregate::scan_all(state.provider.as_ref(), &params).await;
    Json(report).into_response()
}
