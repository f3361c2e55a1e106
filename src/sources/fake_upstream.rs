// In-process stand-in for a platform API, used by the adapter tests.
//
// Serves canned JSON by request path on 127.0.0.1 and records every
// request's path and query so tests can assert on what an adapter sent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::config::Config;

#[derive(Default)]
pub struct FakeUpstream {
    routes: HashMap<String, (StatusCode, Value)>,
}

pub struct RunningUpstream {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeUpstream {
    /// Answer `path` with `status` and `body`. Unknown paths get 404 `{}`.
    pub fn route(mut self, path: &str, status: u16, body: Value) -> Self {
        let status = StatusCode::from_u16(status).expect("valid status code");
        self.routes.insert(path.to_string(), (status, body));
        self
    }

    pub async fn start(self) -> RunningUpstream {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let routes = Arc::new(self.routes);
        let recorded = Arc::clone(&requests);

        let app = Router::new().fallback(move |uri: Uri| {
            let routes = Arc::clone(&routes);
            let recorded = Arc::clone(&recorded);
            async move {
                let request = uri
                    .path_and_query()
                    .map(|pq| pq.to_string())
                    .unwrap_or_default();
                recorded.lock().unwrap().push(request);

                match routes.get(uri.path()) {
                    Some((status, body)) => (*status, Json(body.clone())).into_response(),
                    None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
                }
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        RunningUpstream {
            base_url: format!("http://{addr}"),
            requests,
        }
    }
}

impl RunningUpstream {
    /// Every request received so far, as `path?query`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests whose path is exactly `path`.
    pub fn requests_to(&self, path: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| r.split('?').next() == Some(path))
            .collect()
    }
}

/// Decoded value of `key` in a recorded `path?query` request.
pub fn query_param(request: &str, key: &str) -> Option<String> {
    let url = reqwest::Url::parse(&format!("http://upstream{request}")).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// A client that talks to the fake directly, ignoring any proxy settings.
pub fn direct_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Configuration with only the given variables set.
pub fn config_with(pairs: &[(&str, &str)]) -> Config {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| map.get(key).cloned()).unwrap()
}
