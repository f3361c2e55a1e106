// Reddit source: newest posts of a subreddit, plus comments on flagged posts.
//
// Uses the OAuth API with a "script" app: a password-grant token is fetched
// at the start of every scan (nothing is cached between requests), then
// `/r/{subreddit}/new` returns the newest posts first. Reddit listings have
// no server-side date filter, so freshness comes from the `new` ordering.

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use tracing::{info, warn};

use super::http::{build_client, get_json};
use super::{decode_item, join_text, Source, SourceError, SourceKind};
use crate::config::{Config, RedditCredentials};
use crate::detector;
use crate::models::{DetectionCommon, ScanParams, ScanResult, SourceDetection};

pub const DEFAULT_AUTH_URL: &str = "https://www.reddit.com";
pub const DEFAULT_API_URL: &str = "https://oauth.reddit.com";

/// Reddit's listing endpoints return at most 100 items.
pub const MAX_LIMIT: u32 = 100;

/// Comments examined per flagged post.
pub const COMMENTS_PER_POST: usize = 5;

/// Reddit subreddit names are 1-21 ASCII letters, digits or underscores.
const MAX_SUBREDDIT_LEN: usize = 21;

pub struct RedditSource {
    client: reqwest::Client,
    credentials: RedditCredentials,
    auth_url: String,
    api_url: String,
}

impl RedditSource {
    /// Build the source. Fails fast if any credential is missing.
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        config.require_reddit()?;
        let client = build_client(
            SourceKind::Reddit,
            config.http_timeout,
            &config.reddit.user_agent,
        )?;

        Ok(Self {
            client,
            credentials: config.reddit.clone(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        })
    }

    async fn access_token(&self) -> Result<String, SourceError> {
        let request = self
            .client
            .post(format!("{}/api/v1/access_token", self.auth_url))
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[
                ("grant_type", "password"),
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ]);

        let token: TokenResponse = get_json(SourceKind::Reddit, request).await?;

        // Bad credentials come back as 200 with an `error` field.
        match token.access_token {
            Some(t) if !t.is_empty() => Ok(t),
            _ => Err(SourceError::Upstream {
                service: SourceKind::Reddit.display_name(),
                message: token
                    .error
                    .unwrap_or_else(|| "no access token in response".to_string()),
            }),
        }
    }

    async fn fetch_comments(
        &self,
        token: &str,
        post_id: &str,
    ) -> Result<Vec<serde_json::Value>, SourceError> {
        let request = self
            .client
            .get(format!("{}/comments/{post_id}", self.api_url))
            .bearer_auth(token)
            .query(&[
                ("limit", COMMENTS_PER_POST.to_string()),
                ("sort", "new".to_string()),
                ("depth", "1".to_string()),
                ("raw_json", "1".to_string()),
            ]);

        // The comments endpoint returns [post listing, comment listing].
        let listings: Vec<Listing> = get_json(SourceKind::Reddit, request).await?;
        Ok(listings
            .into_iter()
            .nth(1)
            .map(|l| l.data.children)
            .unwrap_or_default())
    }
}

#[async_trait]
impl Source for RedditSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Reddit
    }

    async fn fetch(&self, params: &ScanParams) -> Result<ScanResult, SourceError> {
        let subreddit = validate_subreddit(&params.subject)?;
        let limit = requested_count(params.limit);
        let mut result = ScanResult::new(SourceKind::Reddit, subreddit);

        info!(subreddit, limit, "Fetching fresh Reddit posts");

        let token = self.access_token().await?;
        let request = self
            .client
            .get(format!("{}/r/{subreddit}/new", self.api_url))
            .bearer_auth(&token)
            .query(&[("limit", limit.to_string()), ("raw_json", "1".to_string())]);
        let listing: Listing = get_json(SourceKind::Reddit, request).await?;

        for child in listing.data.children {
            result.items_scanned += 1;

            let Some(post) = child_data::<RedditPost>(child) else {
                continue;
            };
            let Some(detection) = detect_post(&post) else {
                continue;
            };
            result.push_detection(detection);

            match self.fetch_comments(&token, &post.id).await {
                Ok(comments) => {
                    for detection in detect_comments(&post.title, comments) {
                        result.push_detection(detection);
                    }
                }
                Err(e) => {
                    warn!(post_id = %post.id, error = %e, "Error processing Reddit comments");
                }
            }
        }

        info!(
            posts = result.items_scanned,
            threats = result.threats_found,
            "Reddit scan complete"
        );
        Ok(result)
    }
}

/// Strip an optional `r/` prefix and check the name is a legal subreddit.
/// The name is used verbatim as a URL path segment.
pub fn validate_subreddit(subject: &str) -> Result<&str, SourceError> {
    let name = subject.trim().trim_start_matches("r/");
    let legal = !name.is_empty()
        && name.len() <= MAX_SUBREDDIT_LEN
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');

    if legal {
        Ok(name)
    } else {
        Err(SourceError::InvalidRequest {
            service: SourceKind::Reddit.display_name(),
            message: format!("invalid subreddit name {subject:?}"),
        })
    }
}

/// Clamp the requested post count to Reddit's listing ceiling.
pub fn requested_count(limit: u32) -> u32 {
    limit.clamp(1, MAX_LIMIT)
}

/// Analyze a post's title and body. Returns a detection only for threats.
pub fn detect_post(post: &RedditPost) -> Option<SourceDetection> {
    let content = join_text(&[post.title.as_str(), post.selftext.as_deref().unwrap_or("")]);
    if content.is_empty() {
        return None;
    }

    let analysis = detector::analyze(&content);
    if !analysis.is_threat {
        return None;
    }

    Some(SourceDetection::Post {
        common: DetectionCommon::from_analysis(
            analysis,
            author_or_deleted(post.author.as_deref()),
            permalink_url(&post.permalink),
            utc_timestamp(post.created_utc),
        ),
        title: post.title.clone(),
        score: post.score,
        num_comments: post.num_comments,
    })
}

/// Analyze up to `COMMENTS_PER_POST` top-level comments of a flagged post.
///
/// `children` is the raw comment listing; "more" stubs, deleted comments
/// and malformed entries are skipped.
pub fn detect_comments(post_title: &str, children: Vec<serde_json::Value>) -> Vec<SourceDetection> {
    children
        .into_iter()
        .filter_map(child_data::<RedditComment>)
        .filter(|c| !c.body.is_empty() && c.body != "[deleted]" && c.body != "[removed]")
        .take(COMMENTS_PER_POST)
        .filter_map(|comment| {
            let analysis = detector::analyze(&comment.body);
            if !analysis.is_threat {
                return None;
            }
            Some(SourceDetection::Comment {
                common: DetectionCommon::from_analysis(
                    analysis,
                    author_or_deleted(comment.author.as_deref()),
                    permalink_url(&comment.permalink),
                    utc_timestamp(comment.created_utc),
                ),
                parent_title: post_title.to_string(),
                score: Some(comment.score),
                author_channel_id: None,
            })
        })
        .collect()
}

/// Unwrap a listing child (`{"kind": "t3", "data": {...}}`) into its data.
/// Children of other kinds (e.g. "more") yield `None`.
fn child_data<T: serde::de::DeserializeOwned>(child: serde_json::Value) -> Option<T> {
    let child: Thing = decode_item(SourceKind::Reddit, child)?;
    if child.kind != "t1" && child.kind != "t3" {
        return None;
    }
    decode_item(SourceKind::Reddit, child.data)
}

fn author_or_deleted(author: Option<&str>) -> String {
    author.unwrap_or("[deleted]").to_string()
}

fn permalink_url(permalink: &str) -> String {
    format!("https://reddit.com{permalink}")
}

fn utc_timestamp(created_utc: f64) -> Option<String> {
    DateTime::from_timestamp(created_utc as i64, 0).map(|dt| dt.to_rfc3339())
}

// --- Reddit API response types ---

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct Thing {
    kind: String,
    data: serde_json::Value,
}

/// A submission (`t3`), only the fields we analyze or report.
#[derive(Debug, Clone, Deserialize)]
pub struct RedditPost {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub permalink: String,
    pub created_utc: f64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: u64,
}

/// A comment (`t1`).
#[derive(Debug, Clone, Deserialize)]
pub struct RedditComment {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: Option<String>,
    pub permalink: String,
    pub created_utc: f64,
    #[serde(default)]
    pub score: i64,
}
