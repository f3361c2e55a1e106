// X/Twitter source: recent search over the v2 API.
//
// `GET /2/tweets/search/recent` only covers the last 7 days, and we pass an
// explicit `start_time` as well so the window matches the other sources.
// Author usernames come from the `author_id` expansion in the same response
// rather than one user lookup per tweet.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use tracing::info;

use super::http::{build_client, freshness_cutoff, get_json, USER_AGENT};
use super::{decode_item, Source, SourceError, SourceKind};
use crate::config::Config;
use crate::detector;
use crate::models::{DetectionCommon, ScanParams, ScanResult, SourceDetection};

pub const DEFAULT_API_URL: &str = "https://api.twitter.com";

/// Recent search accepts `max_results` between 10 and 100.
pub const MIN_PAGE: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

const UNKNOWN_USER: &str = "unknown_user";

pub struct TwitterSource {
    client: reqwest::Client,
    bearer_token: String,
    api_url: String,
    freshness_days: i64,
}

impl TwitterSource {
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        config.require_twitter()?;
        Ok(Self {
            client: build_client(SourceKind::Twitter, config.http_timeout, USER_AGENT)?,
            bearer_token: config.twitter_bearer_token.clone(),
            api_url: DEFAULT_API_URL.to_string(),
            freshness_days: config.freshness_days,
        })
    }
}

#[async_trait]
impl Source for TwitterSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Twitter
    }

    async fn fetch(&self, params: &ScanParams) -> Result<ScanResult, SourceError> {
        let limit = requested_count(params.limit);
        let mut result = ScanResult::new(SourceKind::Twitter, &params.subject);

        info!(query = %params.subject, limit, "Fetching fresh tweets");

        let start_time = search_start(Utc::now(), self.freshness_days);

        let request = self
            .client
            .get(format!("{}/2/tweets/search/recent", self.api_url))
            .bearer_auth(&self.bearer_token)
            .query(&[
                ("query", params.subject.clone()),
                ("max_results", limit.max(MIN_PAGE).to_string()),
                ("start_time", start_time.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("tweet.fields", "text,author_id,created_at,public_metrics".to_string()),
                ("expansions", "author_id".to_string()),
                ("user.fields", "username".to_string()),
            ]);

        let response: SearchResponse = get_json(SourceKind::Twitter, request).await?;
        scan_response(&mut result, response, limit as usize);

        info!(
            tweets = result.items_scanned,
            threats = result.threats_found,
            "Twitter scan complete"
        );
        Ok(result)
    }
}

/// Earliest `start_time` to request.
///
/// The API rejects a start_time older than 7 days, so stay a minute inside it.
pub fn search_start(now: DateTime<Utc>, freshness_days: i64) -> DateTime<Utc> {
    freshness_cutoff(now, freshness_days.min(7)) + chrono::Duration::minutes(1)
}

/// Clamp the requested tweet count to the recent-search ceiling.
pub fn requested_count(limit: u32) -> u32 {
    limit.clamp(1, MAX_LIMIT)
}

/// Analyze up to `limit` tweets from a search response into `result`.
pub fn scan_response(result: &mut ScanResult, response: SearchResponse, limit: usize) {
    let usernames: HashMap<String, String> = response
        .includes
        .map(|i| i.users)
        .unwrap_or_default()
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    for value in response.data.into_iter().take(limit) {
        result.items_scanned += 1;

        let Some(tweet) = decode_item::<Tweet>(SourceKind::Twitter, value) else {
            continue;
        };
        if let Some(detection) = detect_tweet(tweet, &usernames) {
            result.push_detection(detection);
        }
    }
}

fn detect_tweet(tweet: Tweet, usernames: &HashMap<String, String>) -> Option<SourceDetection> {
    if tweet.text.trim().is_empty() {
        return None;
    }

    let analysis = detector::analyze(&tweet.text);
    if !analysis.is_threat {
        return None;
    }

    let username = tweet
        .author_id
        .as_ref()
        .and_then(|id| usernames.get(id))
        .cloned()
        .unwrap_or_else(|| UNKNOWN_USER.to_string());
    let url = format!("https://twitter.com/{username}/status/{}", tweet.id);
    let published_at = tweet
        .created_at
        .unwrap_or_else(|| Utc::now().to_rfc3339());

    Some(SourceDetection::Tweet {
        common: DetectionCommon::from_analysis(analysis, &username, url, Some(published_at)),
        tweet_id: tweet.id,
        author_id: tweet.author_id.unwrap_or_else(|| "unknown".to_string()),
        username,
        public_metrics: tweet
            .public_metrics
            .unwrap_or_else(|| serde_json::json!({})),
    })
}

// --- X API v2 response types ---

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
    pub includes: Option<Includes>,
}

#[derive(Debug, Deserialize)]
pub struct Includes {
    #[serde(default)]
    pub users: Vec<User>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    text: String,
    author_id: Option<String>,
    created_at: Option<String>,
    public_metrics: Option<serde_json::Value>,
}
