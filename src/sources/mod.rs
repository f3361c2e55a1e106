// Content sources: one adapter per upstream platform.
//
// Every adapter implements the `Source` trait: fetch one bounded page of
// fresh items, run each item's text through the detector, and return the
// matches as a `ScanResult`. Adapters share an HTTP client builder and a
// status-code mapping in `http`, but are otherwise independent.

pub mod error;
#[cfg(test)]
pub(crate) mod fake_upstream;
pub mod gnews;
pub mod http;
pub mod newsapi;
pub mod reddit;
pub mod traits;
pub mod twitter;
pub mod youtube;

pub use error::SourceError;
pub use traits::{Source, SourceKind};

use serde::de::DeserializeOwned;
use tracing::warn;

/// Decode one upstream item, logging and skipping it if it's malformed.
///
/// Pages are deserialized as raw JSON values first so a single bad item
/// never fails the whole page.
pub(crate) fn decode_item<T: DeserializeOwned>(
    kind: SourceKind,
    value: serde_json::Value,
) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(item) => Some(item),
        Err(e) => {
            warn!(source = kind.as_str(), error = %e, "Skipping malformed item");
            None
        }
    }
}

/// Join non-empty text fields with single spaces.
pub(crate) fn join_text(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_text_skips_empty_parts() {
        assert_eq!(join_text(&["Title", "", "  body "]), "Title body");
        assert_eq!(join_text(&["", "  "]), "");
    }

    #[test]
    fn test_decode_item_skips_malformed() {
        #[derive(serde::Deserialize)]
        struct Item {
            #[allow(dead_code)]
            id: String,
        }
        let good: Option<Item> = decode_item(SourceKind::Gnews, serde_json::json!({"id": "a"}));
        let bad: Option<Item> = decode_item(SourceKind::Gnews, serde_json::json!({"id": 5}));
        assert!(good.is_some());
        assert!(bad.is_none());
    }
}
