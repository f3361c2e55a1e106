// Web server: Axum JSON API over the scan pipeline.
//
// One GET route per source, one aggregate route and a health check. Every
// response is JSON; unknown paths get a 404 listing the available endpoints.
// Handlers never see concrete adapters, only the `SourceProvider` in
// `AppState`, so tests can run the router against fake sources.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, MethodRouter};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::pipeline::{SourceProvider, SourceRegistry};
use crate::sources::SourceKind;

pub mod handlers;

/// Documented endpoints, reported by the health check and the 404 handler.
pub const ENDPOINTS: &[&str] = &[
    "GET /api/reddit/scan?subreddit=<name>&limit=<num>",
    "GET /api/twitter/scan?query=<text>&limit=<num>",
    "GET /api/youtube/scan?query=<text>&limit=<num>",
    "GET /api/gnews/scan?query=<text>&limit=<num>",
    "GET /api/newsapi/scan?query=<text>&limit=<num>",
    "GET /api/scan/all?query=<text>&subreddit=<name>&limit=<num>",
    "GET /api/health",
];

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn SourceProvider>,
    pub config: Arc<Config>,
}

impl AppState {
    /// State backed by the real, lazily built adapters.
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        Self {
            provider: Arc::new(SourceRegistry::new(Arc::clone(&config))),
            config,
        }
    }
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(config: Config, port: u16, bind: &str) -> Result<()> {
    let app = build_router(AppState::new(config));

    let addr = format!("{bind}:{port}");
    info!("Vigil API listening on http://{addr}");
    for endpoint in ENDPOINTS {
        info!("  {endpoint}");
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let mut api = Router::new()
        .route("/api/scan/all", get(handlers::scan::scan_all))
        .route("/api/health", get(handlers::health::health));

    for kind in SourceKind::ALL {
        api = api.route(&format!("/api/{}/scan", kind.as_str()), scan_route(kind));
    }

    api.fallback(not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn scan_route(kind: SourceKind) -> MethodRouter<AppState> {
    get(move |state: State<AppState>, query: Query<handlers::scan::ScanQuery>| {
        handlers::scan::scan_one(state, query, kind)
    })
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        axum::Json(serde_json::json!({
            "error": "Endpoint not found",
            "available_endpoints": ENDPOINTS,
        })),
    )
        .into_response()
}

