// Shared HTTP plumbing for source adapters.
//
// Every adapter builds its client here so all upstream calls, comment
// sub-fetches included, get the same timeout. Status-code checks are
// centralized so adapters stay focused on request construction and
// response mapping.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{SourceError, SourceKind};
use crate::config::MAX_FRESHNESS_DAYS;

pub const USER_AGENT: &str = "vigil/0.1 (harassment-monitor)";

/// Build a reqwest client with the uniform upstream timeout.
pub fn build_client(
    kind: SourceKind,
    timeout: Duration,
    user_agent: &str,
) -> Result<reqwest::Client, SourceError> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|source| SourceError::Transport {
            service: kind.display_name(),
            source,
        })
}

/// Map a non-success status to the matching error. No retries.
pub fn status_error(kind: SourceKind, status: StatusCode) -> SourceError {
    let service = kind.display_name();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SourceError::Unauthorized {
            service,
            status: status.as_u16(),
        },
        StatusCode::TOO_MANY_REQUESTS => SourceError::RateLimited { service },
        _ => SourceError::Http {
            service,
            status: status.as_u16(),
        },
    }
}

/// Send a request and deserialize a successful JSON response.
pub async fn get_json<T: DeserializeOwned>(
    kind: SourceKind,
    request: RequestBuilder,
) -> Result<T, SourceError> {
    let service = kind.display_name();

    let response = request
        .send()
        .await
        .map_err(|source| SourceError::Transport { service, source })?;

    let status = response.status();
    debug!(source = kind.as_str(), status = status.as_u16(), "Upstream response");

    if !status.is_success() {
        return Err(status_error(kind, status));
    }

    response
        .json::<T>()
        .await
        .map_err(|source| SourceError::Transport { service, source })
}

/// Start of the freshness window. `days` is clamped to 1..=MAX_FRESHNESS_DAYS.
pub fn freshness_cutoff(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - chrono::Duration::days(days.clamp(1, MAX_FRESHNESS_DAYS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_statuses_map_to_unauthorized() {
        let err = status_error(SourceKind::Newsapi, StatusCode::UNAUTHORIZED);
        assert!(matches!(err, SourceError::Unauthorized { status: 401, .. }));
        assert_eq!(
            err.to_string(),
            "NewsAPI unauthorized (401) - check API credentials"
        );

        let err = status_error(SourceKind::Gnews, StatusCode::FORBIDDEN);
        assert!(matches!(err, SourceError::Unauthorized { status: 403, .. }));
    }

    #[test]
    fn test_rate_limit_status() {
        let err = status_error(SourceKind::Youtube, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.to_string(), "YouTube rate limit exceeded");
    }

    #[test]
    fn test_other_statuses_are_generic_http_errors() {
        let err = status_error(SourceKind::Reddit, StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "Reddit HTTP error 502");
    }

    #[test]
    fn test_freshness_cutoff_is_days_back() {
        let now = Utc::now();
        let cutoff = freshness_cutoff(now, 7);
        assert_eq!((now - cutoff).num_days(), 7);
    }

    #[test]
    fn test_freshness_cutoff_clamps_out_of_range_days() {
        let now = Utc::now();
        assert_eq!(
            (now - freshness_cutoff(now, 100_000_000)).num_days(),
            MAX_FRESHNESS_DAYS
        );
        assert_eq!((now - freshness_cutoff(now, 0)).num_days(), 1);
        assert!(freshness_cutoff(now, -5) < now);
    }

    #[test]
    fn test_client_builds_with_timeout() {
        assert!(build_client(SourceKind::Gnews, Duration::from_secs(30), USER_AGENT).is_ok());
    }
}
