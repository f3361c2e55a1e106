// Single-source scan: resolve the adapter, fetch, wrap in an envelope.

use tracing::{error, info, warn};

use super::registry::SourceProvider;
use crate::models::ScanParams;
use crate::output::envelope::ServiceEnvelope;
use crate::sources::{Source, SourceKind};

/// How a single-source scan ended. Every variant carries the envelope the
/// caller should return; the variant only decides the status to send with it.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    Completed(ServiceEnvelope),
    /// The upstream call failed.
    Failed(ServiceEnvelope),
    /// The source could not be built.
    Unavailable(ServiceEnvelope),
    /// The parameters were refused before any upstream call.
    Rejected(ServiceEnvelope),
}

impl ScanOutcome {
    pub fn into_envelope(self) -> ServiceEnvelope {
        match self {
            ScanOutcome::Completed(e)
            | ScanOutcome::Failed(e)
            | ScanOutcome::Unavailable(e)
            | ScanOutcome::Rejected(e) => e,
        }
    }
}

/// Run one already-built source. Never fails: errors become a failed envelope.
pub async fn run_source(source: &dyn Source, params: &ScanParams) -> ScanOutcome {
    let kind = source.kind();
    info!(
        source = kind.as_str(),
        subject = %params.subject,
        limit = params.limit,
        "Scan requested"
    );

    match source.fetch(params).await {
        Ok(result) => ScanOutcome::Completed(ServiceEnvelope::success(kind, result)),
        Err(e) if e.is_invalid_request() => {
            warn!(source = kind.as_str(), error = %e, "Scan rejected");
            ScanOutcome::Rejected(ServiceEnvelope::failure(kind, &e))
        }
        Err(e) => {
            error!(source = kind.as_str(), error = %e, "Scan failed");
            ScanOutcome::Failed(ServiceEnvelope::failure(kind, &e))
        }
    }
}

/// Resolve `kind` through the provider and run it.
pub async fn scan_source(
    provider: &dyn SourceProvider,
    kind: SourceKind,
    params: &ScanParams,
) -> ScanOutcome {
    match provider.get_source(kind) {
        Ok(source) => run_source(source.as_ref(), params).await,
        Err(e) => ScanOutcome::Unavailable(ServiceEnvelope::unavailable(kind, &e.to_string())),
    }
}
