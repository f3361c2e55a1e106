// GET /api/health: liveness plus per-source availability.
//
// Resolving each source here also builds it on first call, so a health
// check right after startup reports missing credentials immediately.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use crate::sources::SourceKind;
use crate::web::{AppState, ENDPOINTS};

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let services: serde_json::Map<String, serde_json::Value> = SourceKind::ALL
        .into_iter()
        .map(|kind| {
            let status = match state.provider.get_source(kind) {
                Ok(_) => "available",
                Err(_) => "unavailable",
            };
            (kind.as_str().to_string(), serde_json::Value::from(status))
        })
        .collect();

    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "services": services,
        "endpoints": ENDPOINTS,
    }))
}
