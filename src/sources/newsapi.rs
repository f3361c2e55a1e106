// NewsAPI source: the `/v2/everything` search endpoint.
//
// Same shape as GNews but a different schema: NewsAPI reports authors and
// article content, and wraps API-level failures in `status: "error"`.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::http::{build_client, freshness_cutoff, get_json, USER_AGENT};
use super::{decode_item, join_text, Source, SourceError, SourceKind};
use crate::config::Config;
use crate::detector;
use crate::models::{DetectionCommon, ScanParams, ScanResult, SourceDetection};

pub const DEFAULT_API_URL: &str = "https://newsapi.org";

/// `pageSize` ceiling for `/v2/everything`.
pub const MAX_LIMIT: u32 = 100;

pub struct NewsapiSource {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    freshness_days: i64,
}

impl NewsapiSource {
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        config.require_newsapi()?;
        Ok(Self {
            client: build_client(SourceKind::Newsapi, config.http_timeout, USER_AGENT)?,
            api_key: config.newsapi_key.clone(),
            api_url: DEFAULT_API_URL.to_string(),
            freshness_days: config.freshness_days,
        })
    }
}

#[async_trait]
impl Source for NewsapiSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Newsapi
    }

    async fn fetch(&self, params: &ScanParams) -> Result<ScanResult, SourceError> {
        let limit = requested_count(params.limit);
        let mut result = ScanResult::new(SourceKind::Newsapi, &params.subject);

        info!(query = %params.subject, limit, "Fetching fresh NewsAPI articles");

        // NewsAPI's `from` takes a plain date.
        let from = freshness_cutoff(Utc::now(), self.freshness_days)
            .format("%Y-%m-%d")
            .to_string();
        let page_size = limit.to_string();

        let request = self
            .client
            .get(format!("{}/v2/everything", self.api_url))
            .query(&[
                ("q", params.subject.as_str()),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("from", from.as_str()),
                ("apiKey", self.api_key.as_str()),
            ]);
        let response: EverythingResponse = get_json(SourceKind::Newsapi, request).await?;
        scan_response(&mut result, response)?;

        info!(
            articles = result.items_scanned,
            threats = result.threats_found,
            "NewsAPI scan complete"
        );
        Ok(result)
    }
}

pub fn requested_count(limit: u32) -> u32 {
    limit.clamp(1, MAX_LIMIT)
}

/// Analyze every article of an `/v2/everything` response into `result`.
pub fn scan_response(
    result: &mut ScanResult,
    response: EverythingResponse,
) -> Result<(), SourceError> {
    if response.status != "ok" {
        return Err(SourceError::Upstream {
            service: SourceKind::Newsapi.display_name(),
            message: response
                .message
                .unwrap_or_else(|| "Unknown error".to_string()),
        });
    }

    for value in response.articles {
        result.items_scanned += 1;

        let Some(article) = decode_item::<Article>(SourceKind::Newsapi, value) else {
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
    let content = join_text(&[
        title.as_str(),
        description.as_str(),
        article.content.as_deref().unwrap_or(""),
    ]);
    if content.is_empty() {
        return None;
    }

    let analysis = detector::analyze(&content);
    if !analysis.is_threat {
        return None;
    }

    Some(SourceDetection::NewsArticle {
        common: DetectionCommon::from_analysis(
            analysis,
            article.author.unwrap_or_else(|| "Unknown Author".to_string()),
            article.url.unwrap_or_default(),
            article.published_at,
        ),
        title,
        description,
        source_name: article
            .source
            .and_then(|s| s.name)
            .unwrap_or_else(|| "Unknown".to_string()),
        image_url: article.url_to_image,
    })
}

// --- NewsAPI response types ---

#[derive(Debug, Deserialize)]
pub struct EverythingResponse {
    pub status: String,
    pub message: Option<String>,
    #[serde(default)]
    pub articles: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    source: Option<ArticleSource>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
    content: Option<String>,
}

#[derive(Deserialize)]
struct ArticleSource {
    name: Option<String>,
}
