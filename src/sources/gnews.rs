// GNews source: article search over the GNews v4 API.
//
// Articles are requested newest first (`sortby=publishedAt`) and restricted
// to the freshness window with `from`. A 2xx body without `articles` is an
// API-level error (GNews reports those in an `errors` field).

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use tracing::info;

use super::http::{build_client, freshness_cutoff, get_json, USER_AGENT};
use super::{decode_item, join_text, Source, SourceError, SourceKind};
use crate::config::Config;
use crate::detector;
use crate::models::{DetectionCommon, ScanParams, ScanResult, SourceDetection};

pub const DEFAULT_API_URL: &str = "https://gnews.io";

pub const MAX_LIMIT: u32 = 100;

/// GNews doesn't report article authors.
const AUTHOR: &str = "GNews Source";

pub struct GnewsSource {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    freshness_days: i64,
}

impl GnewsSource {
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        config.require_gnews()?;
        Ok(Self {
            client: build_client(SourceKind::Gnews, config.http_timeout, USER_AGENT)?,
            api_key: config.gnews_api_key.clone(),
            api_url: DEFAULT_API_URL.to_string(),
            freshness_days: config.freshness_days,
        })
    }
}

#[async_trait]
impl Source for GnewsSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Gnews
    }

    async fn fetch(&self, params: &ScanParams) -> Result<ScanResult, SourceError> {
        let limit = requested_count(params.limit);
        let mut result = ScanResult::new(SourceKind::Gnews, &params.subject);

        info!(query = %params.subject, limit, "Fetching fresh GNews articles");

        let from = freshness_cutoff(Utc::now(), self.freshness_days)
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let max = limit.to_string();

        let request = self
            .client
            .get(format!("{}/api/v4/search", self.api_url))
            .query(&[
                ("q", params.subject.as_str()),
                ("lang", "en"),
                ("max", max.as_str()),
                ("token", self.api_key.as_str()),
                ("sortby", "publishedAt"),
                ("from", from.as_str()),
            ]);
        let response: SearchResponse = get_json(SourceKind::Gnews, request).await?;
        scan_response(&mut result, response)?;

        info!(
            articles = result.items_scanned,
            threats = result.threats_found,
            "GNews scan complete"
        );
        Ok(result)
    }
}

pub fn requested_count(limit: u32) -> u32 {
    limit.clamp(1, MAX_LIMIT)
}

/// Analyze every article of a search response into `result`.
pub fn scan_response(result: &mut ScanResult, response: SearchResponse) -> Result<(), SourceError> {
    let Some(articles) = response.articles else {
        let message = match response.errors {
            Some(errors) => errors.to_string(),
            None => "unexpected response without articles".to_string(),
        };
        return Err(SourceError::Upstream {
            service: SourceKind::Gnews.display_name(),
            message,
        });
    };

    for value in articles {
        result.items_scanned += 1;

        let Some(article) = decode_item::<Article>(SourceKind::Gnews, value) else {
            continue;
        };
        if let Some(detection) = detect_article(article) {
            result.push_detection(detection);
        }
    }
    Ok(())
}

fn detect_article(article: Article) -> Option<SourceDetection> {
    let title = article.title.unwrap_or_default();
    let description = article.description.unwrap_or_default();
    let content = join_text(&[title.as_str(), description.as_str()]);
    if content.is_empty() {
        return None;
    }

    let analysis = detector::analyze(&content);
    if !analysis.is_threat {
        return None;
    }

    let source = article.source.unwrap_or_default();
    Some(SourceDetection::NewsArticle {
        common: DetectionCommon::from_analysis(
            analysis,
            AUTHOR,
            article.url.unwrap_or_default(),
            article.published_at,
        ),
        title,
        description,
        source_name: source.name.unwrap_or_else(|| "Unknown Source".to_string()),
        image_url: article.image,
    })
}

// --- GNews response types ---

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub articles: Option<Vec<serde_json::Value>>,
    pub errors: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    image: Option<String>,
    published_at: Option<String>,
    source: Option<ArticleSource>,
}

#[derive(Deserialize, Default)]
struct ArticleSource {
    name: Option<String>,
}
