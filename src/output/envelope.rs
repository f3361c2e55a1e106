// Uniform response envelope around a single source's scan.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::ScanResult;
use crate::sources::{SourceError, SourceKind};

/// What every per-source route and every aggregate entry returns.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceEnvelope {
    /// Platform display name ("Reddit", "YouTube", ...)
    pub service: String,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
    pub data: Option<ScanResult>,
    /// Only meaningful for list-shaped payloads, so always 0 for a `ScanResult`.
    pub total_items: usize,
}

impl ServiceEnvelope {
    /// Wrap a scan outcome. Stamps the current time and nothing else.
    pub fn wrap(
        kind: SourceKind,
        data: Option<ScanResult>,
        success: bool,
        message: impl Into<String>,
        error: Option<String>,
    ) -> Self {
        Self {
            service: kind.display_name().to_string(),
            timestamp: Utc::now(),
            success,
            message: message.into(),
            error,
            data,
            total_items: 0,
        }
    }

    /// Successful scan, with the summary line as the message.
    pub fn success(kind: SourceKind, result: ScanResult) -> Self {
        let message = result.summary(kind);
        Self::wrap(kind, Some(result), true, message, None)
    }

    /// The source was reached but the scan itself failed.
    pub fn failure(kind: SourceKind, err: &SourceError) -> Self {
        let text = err.to_string();
        Self::wrap(kind, None, false, text.clone(), Some(text))
    }

    /// The source could not be built (usually missing credentials).
    pub fn unavailable(kind: SourceKind, reason: &str) -> Self {
        let name = kind.display_name();
        Self::wrap(
            kind,
            None,
            false,
            format!("{name} service unavailable"),
            Some(format!("{name} service unavailable: {reason}")),
        )
    }

    pub fn threats_found(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.threats_found)
    }
}
