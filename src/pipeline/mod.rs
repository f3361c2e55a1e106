// Scan pipeline: resolve sources, run them, and merge the results.
//
// `registry` owns adapter construction (memoized, once per kind),
// `scan` runs one source into an envelope, and `aggregate` fans a request
// out across every configured source.

pub mod aggregate;
pub mod registry;
pub mod scan;

pub use aggregate::{scan_all, AggregateParams, AggregateReport};
pub use registry::{SourceProvider, SourceRegistry};
pub use scan::{scan_source, ScanOutcome};
