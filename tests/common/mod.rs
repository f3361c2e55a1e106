// Shared fakes for integration tests: in-memory sources and a provider,
// so the pipeline and router run without any network access.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use vigil::detector;
use vigil::models::{DetectionCommon, ScanParams, ScanResult, SourceDetection};
use vigil::pipeline::SourceProvider;
use vigil::sources::{Source, SourceError, SourceKind};

/// A source that "fetches" a fixed list of texts.
pub struct FakeSource {
    pub kind: SourceKind,
    pub texts: Vec<&'static str>,
    pub fail: bool,
    pub delay: Duration,
}

impl FakeSource {
    pub fn ok(kind: SourceKind, texts: &[&'static str]) -> Self {
        Self {
            kind,
            texts: texts.to_vec(),
            fail: false,
            delay: Duration::ZERO,
        }
    }

    pub fn failing(kind: SourceKind) -> Self {
        Self {
            kind,
            texts: Vec::new(),
            fail: true,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl Source for FakeSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(&self, params: &ScanParams) -> Result<ScanResult, SourceError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(SourceError::RateLimited {
                service: self.kind.display_name(),
            });
        }

        let mut result = ScanResult::new(self.kind, &params.subject);
        for (i, text) in self.texts.iter().take(params.limit as usize).enumerate() {
            result.items_scanned += 1;
            let analysis = detector::analyze(text);
            if !analysis.is_threat {
                continue;
            }
            result.push_detection(SourceDetection::NewsArticle {
                common: DetectionCommon::from_analysis(
                    analysis,
                    "Test Author",
                    format!("https://example.com/{}/{i}", self.kind),
                    None,
                ),
                title: text.to_string(),
                description: String::new(),
                source_name: "Fixture".to_string(),
                image_url: None,
            });
        }
        Ok(result)
    }
}

/// Provider over a fixed set of fakes. Kinds not registered are unavailable.
#[derive(Default)]
pub struct FakeProvider {
    sources: HashMap<SourceKind, Arc<dyn Source>>,
}

impl FakeProvider {
    pub fn with(mut self, source: FakeSource) -> Self {
        self.sources.insert(source.kind, Arc::new(source));
        self
    }
}

impl SourceProvider for FakeProvider {
    fn get_source(&self, kind: SourceKind) -> Result<Arc<dyn Source>, SourceError> {
        self.sources.get(&kind).cloned().ok_or_else(|| {
            SourceError::Configuration(format!("{} credentials not set", kind.display_name()))
        })
    }
}

pub const HARASSMENT_TEXTS: &[&str] = &[
    "Women harassment reported by local police",
    "Nice weather today",
    "Survivor speaks out about domestic violence",
];
