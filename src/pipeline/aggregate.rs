// Aggregate scan: one request fanned out across every source.
//
// All sources run concurrently; `join_all` hands the results back in input
// order, so the report always lists services in `SourceKind::ALL` order no
// matter which upstream answered first. A source that is unavailable or
// fails only contributes a failed envelope to its own slot.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::info;

use super::registry::SourceProvider;
use super::scan::scan_source;
use crate::models::ScanParams;
use crate::output::envelope::ServiceEnvelope;
use crate::sources::SourceKind;

pub const DEFAULT_QUERY: &str = "harassment OR abuse";
pub const DEFAULT_SUBREDDIT: &str = "TwoXChromosomes";
pub const DEFAULT_LIMIT: u32 = 20;

/// Inputs for an aggregate scan. Reddit gets `subreddit`, everyone else `query`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateParams {
    pub query: String,
    pub subreddit: String,
    pub limit: u32,
}

impl Default for AggregateParams {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            subreddit: DEFAULT_SUBREDDIT.to_string(),
            limit: DEFAULT_LIMIT,
        }
    }
}

impl AggregateParams {
    pub fn for_source(&self, kind: SourceKind) -> ScanParams {
        let subject = if kind.takes_subreddit() {
            &self.subreddit
        } else {
            &self.query
        };
        ScanParams::new(subject.clone(), self.limit)
    }
}

/// Per-service envelopes in fixed source order.
///
/// Serialized as a JSON object keyed by source name ("reddit", ...), with
/// keys in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ServiceMap(Vec<(SourceKind, ServiceEnvelope)>);

impl ServiceMap {
    pub fn get(&self, kind: SourceKind) -> Option<&ServiceEnvelope> {
        self.0.iter().find(|(k, _)| *k == kind).map(|(_, e)| e)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(SourceKind, ServiceEnvelope)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ServiceMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (kind, envelope) in &self.0 {
            map.serialize_entry(kind.as_str(), envelope)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub scan_timestamp: DateTime<Utc>,
    /// Sum of `threats_found` over successful services only
    pub total_threats_found: usize,
    /// Number of services whose envelope has `success == true`
    pub services_scanned: usize,
    pub services: ServiceMap,
    pub scan_completed: DateTime<Utc>,
}

impl AggregateReport {
    /// Fold per-service envelopes into a report.
    pub fn from_envelopes(
        scan_timestamp: DateTime<Utc>,
        envelopes: Vec<(SourceKind, ServiceEnvelope)>,
    ) -> Self {
        let successful = envelopes.iter().filter(|(_, e)| e.success);
        let total_threats_found = successful.clone().map(|(_, e)| e.threats_found()).sum();
        let services_scanned = successful.count();

        Self {
            scan_timestamp,
            total_threats_found,
            services_scanned,
            services: ServiceMap(envelopes),
            scan_completed: Utc::now(),
        }
    }
}

/// Scan every source and merge the envelopes into one report.
pub async fn scan_all(provider: &dyn SourceProvider, params: &AggregateParams) -> AggregateReport {
    let scan_timestamp = Utc::now();
    info!(
        query = %params.query,
        subreddit = %params.subreddit,
        limit = params.limit,
        "Aggregate scan started"
    );

    let scans = SourceKind::ALL.into_iter().map(|kind| async move {
        let source_params = params.for_source(kind);
        let outcome = scan_source(provider, kind, &source_params).await;
        (kind, outcome.into_envelope())
    });
    let envelopes = join_all(scans).await;

    let report = AggregateReport::from_envelopes(scan_timestamp, envelopes);
    info!(
        total_threats = report.total_threats_found,
        services_scanned = report.services_scanned,
        "Aggregate scan completed"
    );
    report
}
