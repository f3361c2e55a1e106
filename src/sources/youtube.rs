// YouTube source: recent video search plus comments on flagged videos.
//
// Searches with `order=date` and `publishedAfter` so only videos from the
// freshness window come back, newest first. For every flagged video the
// newest comment threads are fetched and analyzed too; videos with comments
// disabled answer 403, which is logged and skipped.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use super::http::{build_client, freshness_cutoff, get_json, USER_AGENT};
use super::{decode_item, join_text, Source, SourceError, SourceKind};
use crate::config::Config;
use crate::detector;
use crate::models::{DetectionCommon, ScanParams, ScanResult, SourceDetection};
use crate::output::truncate_chars;

pub const DEFAULT_API_URL: &str = "https://www.googleapis.com";

/// `search.list` returns at most 50 results per page.
pub const MAX_LIMIT: u32 = 50;

/// Comment threads examined per flagged video.
pub const COMMENTS_PER_VIDEO: u32 = 10;

const DESCRIPTION_CHARS: usize = 300;

pub struct YoutubeSource {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    freshness_days: i64,
}

impl YoutubeSource {
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        config.require_youtube()?;
        Ok(Self {
            client: build_client(SourceKind::Youtube, config.http_timeout, USER_AGENT)?,
            api_key: config.youtube_api_key.clone(),
            api_url: DEFAULT_API_URL.to_string(),
            freshness_days: config.freshness_days,
        })
    }

    async fn fetch_comments(&self, video_id: &str) -> Result<ListResponse, SourceError> {
        let max_results = COMMENTS_PER_VIDEO.to_string();
        let request = self
            .client
            .get(format!("{}/youtube/v3/commentThreads", self.api_url))
            .query(&[
                ("part", "snippet"),
                ("videoId", video_id),
                ("maxResults", max_results.as_str()),
                ("order", "time"),
                ("key", self.api_key.as_str()),
            ]);
        get_json(SourceKind::Youtube, request).await
    }
}

#[async_trait]
impl Source for YoutubeSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Youtube
    }

    async fn fetch(&self, params: &ScanParams) -> Result<ScanResult, SourceError> {
        let limit = requested_count(params.limit);
        let mut result = ScanResult::new(SourceKind::Youtube, &params.subject);

        info!(query = %params.subject, limit, "Fetching fresh YouTube videos");

        let published_after = freshness_cutoff(Utc::now(), self.freshness_days)
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let max_results = limit.to_string();

        let request = self
            .client
            .get(format!("{}/youtube/v3/search", self.api_url))
            .query(&[
                ("part", "snippet"),
                ("q", params.subject.as_str()),
                ("order", "date"),
                ("maxResults", max_results.as_str()),
                ("type", "video"),
                ("publishedAfter", published_after.as_str()),
                ("regionCode", "US"),
                ("key", self.api_key.as_str()),
            ]);
        let search: ListResponse = get_json(SourceKind::Youtube, request).await?;

        for value in search.items {
            result.items_scanned += 1;

            let Some(video) = decode_item::<SearchItem>(SourceKind::Youtube, value) else {
                continue;
            };
            let Some(detection) = detect_video(&video) else {
                continue;
            };
            result.push_detection(detection);

            match self.fetch_comments(&video.id.video_id).await {
                Ok(threads) => {
                    for detection in detect_comments(&video, threads) {
                        result.push_detection(detection);
                    }
                }
                Err(SourceError::Unauthorized { status: 403, .. }) => {
                    warn!(video_id = %video.id.video_id, "Comments disabled for video");
                }
                Err(e) => {
                    warn!(video_id = %video.id.video_id, error = %e, "Error fetching YouTube comments");
                }
            }
        }

        info!(
            videos = result.items_scanned,
            threats = result.threats_found,
            "YouTube scan complete"
        );
        Ok(result)
    }
}

/// Clamp the requested video count to the search page ceiling.
pub fn requested_count(limit: u32) -> u32 {
    limit.clamp(1, MAX_LIMIT)
}

pub fn video_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Analyze a video's title and description.
pub fn detect_video(video: &SearchItem) -> Option<SourceDetection> {
    let snippet = &video.snippet;
    let content = join_text(&[snippet.title.as_str(), snippet.description.as_str()]);
    if content.is_empty() {
        return None;
    }

    let analysis = detector::analyze(&content);
    if !analysis.is_threat {
        return None;
    }

    Some(SourceDetection::Video {
        common: DetectionCommon::from_analysis(
            analysis,
            &snippet.channel_title,
            video_url(&video.id.video_id),
            Some(snippet.published_at.clone()),
        ),
        title: snippet.title.clone(),
        description: truncate_chars(&snippet.description, DESCRIPTION_CHARS),
        channel_title: snippet.channel_title.clone(),
        channel_id: snippet.channel_id.clone(),
        video_id: video.id.video_id.clone(),
        thumbnails: snippet.thumbnails.clone(),
    })
}

/// Analyze the comment threads fetched for a flagged video.
pub fn detect_comments(video: &SearchItem, threads: ListResponse) -> Vec<SourceDetection> {
    threads
        .items
        .into_iter()
        .filter_map(|value| decode_item::<CommentThread>(SourceKind::Youtube, value))
        .filter_map(|thread| {
            let comment = thread.snippet.top_level_comment.snippet;
            let analysis = detector::analyze(&comment.text_display);
            if !analysis.is_threat {
                return None;
            }
            Some(SourceDetection::Comment {
                common: DetectionCommon::from_analysis(
                    analysis,
                    comment.author_display_name,
                    video_url(&video.id.video_id),
                    Some(comment.published_at),
                ),
                parent_title: video.snippet.title.clone(),
                score: None,
                author_channel_id: Some(
                    comment.author_channel_id.map(|c| c.value).unwrap_or_default(),
                ),
            })
        })
        .collect()
}

// --- YouTube Data API v3 response types ---

#[derive(Debug, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    pub id: VideoId,
    pub snippet: VideoSnippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoId {
    pub video_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub channel_id: String,
    pub published_at: String,
    #[serde(default)]
    pub thumbnails: serde_json::Value,
}

#[derive(Deserialize)]
struct CommentThread {
    snippet: CommentThreadSnippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    text_display: String,
    #[serde(default)]
    author_display_name: String,
    author_channel_id: Option<ChannelRef>,
    published_at: String,
}

#[derive(Deserialize)]
struct ChannelRef {
    value: String,
}
