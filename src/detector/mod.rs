// Harassment/abuse detector: keyword and pattern matching over plain text.
//
// The detector is a pure function of its input: no network, no I/O, no
// state between calls. Scans call it once per post, comment, article,
// video and tweet, so it has to stay a single cheap pass over the text.

pub mod keywords;

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::output::truncate_chars;

use keywords::{HIGH_PRIORITY_TERMS, KEYWORDS, PATTERNS};

/// Characters kept in `text_preview` before the "..." marker.
pub const PREVIEW_CHARS: usize = 200;

const BASE_CONFIDENCE: f64 = 0.4;
const PER_TERM_BONUS: f64 = 0.1;
const HIGH_PRIORITY_BONUS: f64 = 0.3;
const MAX_CONFIDENCE: f64 = 0.95;

/// Classification label attached to every analyzed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    HarassmentAbuse,
    Safe,
    /// The detector itself failed; the text was not classified.
    Error,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::HarassmentAbuse => "harassment_abuse",
            Category::Safe => "safe",
            Category::Error => "error",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The result of analyzing a single piece of text.
///
/// `is_threat == false` always carries `confidence == 0.0` and a non-threat
/// category; `is_threat == true` always carries `HarassmentAbuse`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    pub is_threat: bool,
    /// 0.0 for non-threats, otherwise 0.4 to 0.95
    pub confidence: f64,
    /// Keywords found as substrings. Empty when only a pattern matched.
    pub matched_terms: Vec<String>,
    pub text_preview: String,
    pub category: Category,
    pub analyzed_at: DateTime<Utc>,
}

impl DetectionResult {
    fn safe(text: &str) -> Self {
        Self {
            is_threat: false,
            confidence: 0.0,
            matched_terms: Vec::new(),
            text_preview: truncate_chars(text, PREVIEW_CHARS),
            category: Category::Safe,
            analyzed_at: Utc::now(),
        }
    }

    /// Result returned when analysis could not run at all.
    pub fn error() -> Self {
        Self {
            is_threat: false,
            confidence: 0.0,
            matched_terms: Vec::new(),
            text_preview: "Error analyzing text".to_string(),
            category: Category::Error,
            analyzed_at: Utc::now(),
        }
    }
}

/// Compiled keyword/pattern detector.
pub struct Detector {
    keywords: &'static [&'static str],
    high_priority: &'static [&'static str],
    patterns: Vec<Regex>,
}

impl Detector {
    /// Compile the built-in harassment/abuse vocabulary.
    pub fn new() -> Result<Self, regex_lite::Error> {
        let patterns = PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            keywords: KEYWORDS,
            high_priority: HIGH_PRIORITY_TERMS,
            patterns,
        })
    }

    /// Classify `text`. Never fails; empty text is simply safe.
    pub fn analyze(&self, text: &str) -> DetectionResult {
        if text.trim().is_empty() {
            return DetectionResult::safe(text);
        }

        let lowered = text.to_lowercase();

        let matched_terms: Vec<String> = self
            .keywords
            .iter()
            .filter(|kw| lowered.contains(*kw))
            .map(|kw| kw.to_string())
            .collect();
        let keyword_match = !matched_terms.is_empty();
        let pattern_match = !keyword_match && self.patterns.iter().any(|p| p.is_match(&lowered));

        if !keyword_match && !pattern_match {
            return DetectionResult::safe(text);
        }

        let high_priority = self.high_priority.iter().any(|t| lowered.contains(t));
        let confidence = confidence_for(matched_terms.len(), high_priority);

        DetectionResult {
            is_threat: true,
            confidence,
            matched_terms,
            text_preview: truncate_chars(text, PREVIEW_CHARS),
            category: Category::HarassmentAbuse,
            analyzed_at: Utc::now(),
        }
    }
}

/// Confidence formula: 0.4 base, +0.1 per matched keyword, +0.3 when a
/// high-priority phrase is present, capped at 0.95 and rounded to 2 places.
pub fn confidence_for(matched_terms: usize, high_priority: bool) -> f64 {
    let mut confidence = BASE_CONFIDENCE + PER_TERM_BONUS * matched_terms as f64;
    if high_priority {
        confidence += HIGH_PRIORITY_BONUS;
    }
    (confidence.min(MAX_CONFIDENCE) * 100.0).round() / 100.0
}

static DEFAULT_DETECTOR: LazyLock<Option<Detector>> = LazyLock::new(|| match Detector::new() {
    Ok(detector) => Some(detector),
    Err(e) => {
        error!(error = %e, "Failed to compile detector patterns");
        None
    }
});

/// Analyze text with the built-in vocabulary.
///
/// If the detector could not be built, every call returns a
/// `Category::Error` result instead of panicking.
pub fn analyze(text: &str) -> DetectionResult {
    match DEFAULT_DETECTOR.as_ref() {
        Some(detector) => detector.analyze(text),
        None => DetectionResult::error(),
    }
}
