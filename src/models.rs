// Scan models: the normalized shapes every source produces.
//
// Each platform returns its own JSON schema; sources convert matched items
// into a `SourceDetection` variant so the aggregator and the HTTP layer only
// ever see one shape per scan.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::detector::{Category, DetectionResult};
use crate::sources::SourceKind;

/// What every scan focuses on. Reported in `source_info.focus`.
pub const SCAN_FOCUS: &str = "harassment_abuse";

/// Caller-supplied scan parameters, already resolved against defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanParams {
    /// Search query, or the subreddit name for Reddit
    pub subject: String,
    /// Requested item count; each source clamps it to its platform ceiling
    pub limit: u32,
}

impl ScanParams {
    pub fn new(subject: impl Into<String>, limit: u32) -> Self {
        Self {
            subject: subject.into(),
            limit,
        }
    }
}

/// Fields shared by every detection, whatever the platform.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionCommon {
    /// Truncated text that was analyzed
    pub content: String,
    pub author: String,
    pub source_url: String,
    pub confidence: f64,
    pub matched_terms: Vec<String>,
    pub category: Category,
    pub published_at: Option<String>,
}

impl DetectionCommon {
    /// Carry the detector's verdict over into a detection record.
    pub fn from_analysis(
        analysis: DetectionResult,
        author: impl Into<String>,
        source_url: impl Into<String>,
        published_at: Option<String>,
    ) -> Self {
        Self {
            content: analysis.text_preview,
            author: author.into(),
            source_url: source_url.into(),
            confidence: analysis.confidence,
            matched_terms: analysis.matched_terms,
            category: analysis.category,
            published_at,
        }
    }
}

/// One flagged unit of content. Serialized with a `detection_type` tag.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "detection_type", rename_all = "snake_case")]
pub enum SourceDetection {
    Post {
        #[serde(flatten)]
        common: DetectionCommon,
        title: String,
        score: i64,
        num_comments: u64,
    },
    Comment {
        #[serde(flatten)]
        common: DetectionCommon,
        /// Title of the post or video the comment belongs to
        parent_title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        score: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        author_channel_id: Option<String>,
    },
    NewsArticle {
        #[serde(flatten)]
        common: DetectionCommon,
        title: String,
        description: String,
        source_name: String,
        image_url: Option<String>,
    },
    Video {
        #[serde(flatten)]
        common: DetectionCommon,
        title: String,
        description: String,
        channel_title: String,
        channel_id: String,
        video_id: String,
        thumbnails: serde_json::Value,
    },
    Tweet {
        #[serde(flatten)]
        common: DetectionCommon,
        tweet_id: String,
        author_id: String,
        username: String,
        public_metrics: serde_json::Value,
    },
}

impl SourceDetection {
    pub fn common(&self) -> &DetectionCommon {
        match self {
            SourceDetection::Post { common, .. }
            | SourceDetection::Comment { common, .. }
            | SourceDetection::NewsArticle { common, .. }
            | SourceDetection::Video { common, .. }
            | SourceDetection::Tweet { common, .. } => common,
        }
    }

    pub fn detection_type(&self) -> &'static str {
        match self {
            SourceDetection::Post { .. } => "post",
            SourceDetection::Comment { .. } => "comment",
            SourceDetection::NewsArticle { .. } => "news_article",
            SourceDetection::Video { .. } => "video",
            SourceDetection::Tweet { .. } => "tweet",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub platform: String,
    pub query: String,
    pub scan_time: DateTime<Utc>,
    pub focus: String,
}

/// Everything one source found in one scan.
///
/// `threats_found` always equals `detections.len()`. Use `push_detection`
/// rather than touching either field directly. Comments count separately
/// from their parent, so a flagged post with two flagged comments adds 3.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub query: String,
    pub items_scanned: usize,
    pub threats_found: usize,
    /// Upstream return order, never re-sorted
    pub detections: Vec<SourceDetection>,
    pub source_info: SourceInfo,
}

impl ScanResult {
    pub fn new(kind: SourceKind, query: &str) -> Self {
        Self {
            query: query.to_string(),
            items_scanned: 0,
            threats_found: 0,
            detections: Vec::new(),
            source_info: SourceInfo {
                platform: kind.display_name().to_string(),
                query: kind.display_subject(query),
                scan_time: Utc::now(),
                focus: SCAN_FOCUS.to_string(),
            },
        }
    }

    pub fn push_detection(&mut self, detection: SourceDetection) {
        self.detections.push(detection);
        self.threats_found = self.detections.len();
    }

    /// Human-readable summary used as the envelope message.
    pub fn summary(&self, kind: SourceKind) -> String {
        format!(
            "Fresh {} scan completed: {} {}, {} harassment/abuse cases found",
            kind.display_name(),
            self.items_scanned,
            kind.item_noun(),
            self.threats_found
        )
    }
}
