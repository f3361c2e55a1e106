// Source error taxonomy.

use thiserror::Error;

/// Errors a source can return for a whole scan.
///
/// Per-item problems never become a `SourceError`. The item is skipped
/// and the scan continues.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A required credential is missing. Raised when the source is built.
    #[error("{0}")]
    Configuration(String),

    /// Upstream rejected our credentials (401/403).
    #[error("{service} unauthorized ({status}) - check API credentials")]
    Unauthorized {
        service: &'static str,
        status: u16,
    },

    /// Upstream returned 429 Too Many Requests. Not retried.
    #[error("{service} rate limit exceeded")]
    RateLimited { service: &'static str },

    /// Any other non-success status.
    #[error("{service} HTTP error {status}")]
    Http {
        service: &'static str,
        status: u16,
    },

    /// Caller-supplied parameters can't be sent upstream. Raised before
    /// any request is made.
    #[error("{service} rejected request: {message}")]
    InvalidRequest {
        service: &'static str,
        message: String,
    },

    /// Upstream answered 2xx but the body reports an error.
    #[error("{service} API error: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    /// Connection failure, timeout, or undecodable body.
    #[error("Error fetching fresh {service} data: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl SourceError {
    /// True for errors raised while building the source rather than calling it.
    pub fn is_configuration(&self) -> bool {
        matches!(self, SourceError::Configuration(_))
    }

    pub fn is_invalid_request(&self) -> bool {
        matches!(self, SourceError::InvalidRequest { .. })
    }
}
