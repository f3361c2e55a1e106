// Source trait: the capability every platform adapter implements.
//
// There's no shared base type: each adapter owns its client and credentials
// and only promises `fetch`. Wrapping the result in an envelope is done by
// `output::envelope`, outside the adapter.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::SourceError;
use crate::models::{ScanParams, ScanResult};

/// The configured platforms, in aggregate-report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(clap::ValueEnum)]
pub enum SourceKind {
    Reddit,
    Twitter,
    Youtube,
    Gnews,
    Newsapi,
}

impl SourceKind {
    /// Fixed scan order for aggregate reports.
    pub const ALL: [SourceKind; 5] = [
        SourceKind::Reddit,
        SourceKind::Twitter,
        SourceKind::Youtube,
        SourceKind::Gnews,
        SourceKind::Newsapi,
    ];

    /// Route/registry key (e.g. "reddit").
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Reddit => "reddit",
            SourceKind::Twitter => "twitter",
            SourceKind::Youtube => "youtube",
            SourceKind::Gnews => "gnews",
            SourceKind::Newsapi => "newsapi",
        }
    }

    /// Platform name used in envelopes and messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceKind::Reddit => "Reddit",
            SourceKind::Twitter => "Twitter",
            SourceKind::Youtube => "YouTube",
            SourceKind::Gnews => "GNews",
            SourceKind::Newsapi => "NewsAPI",
        }
    }

    /// Plural noun for the items this platform returns.
    pub fn item_noun(&self) -> &'static str {
        match self {
            SourceKind::Reddit => "posts",
            SourceKind::Twitter => "tweets",
            SourceKind::Youtube => "videos",
            SourceKind::Gnews | SourceKind::Newsapi => "articles",
        }
    }

    /// Subject used when the caller doesn't pass a query (or subreddit).
    pub fn default_subject(&self) -> &'static str {
        match self {
            SourceKind::Reddit => "TwoXChromosomes",
            SourceKind::Twitter => "(women harassment OR women abuse OR sexual harassment OR gender violence OR domestic violence OR stalking women) -is:retweet lang:en",
            SourceKind::Youtube => "women harassment",
            SourceKind::Gnews => "women harassment OR gender violence OR sexual harassment",
            SourceKind::Newsapi => "women harassment OR women abuse OR sexual harassment",
        }
    }

    /// Subject as shown in `source_info.query` ("r/name" for subreddits).
    pub fn display_subject(&self, subject: &str) -> String {
        match self {
            SourceKind::Reddit => format!("r/{subject}"),
            _ => subject.to_string(),
        }
    }

    /// Reddit takes a subreddit name; every other platform takes a query.
    pub fn takes_subreddit(&self) -> bool {
        matches!(self, SourceKind::Reddit)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown source: {s}"))
    }
}

/// A platform adapter: one bounded, fresh-first fetch per call.
#[async_trait]
pub trait Source: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Fetch a page of fresh items for `params.subject`, run each through the
    /// detector and return the matches in upstream order.
    ///
    /// Malformed items and failed comment sub-fetches are skipped inside the
    /// call; only a failure of the main page request is returned as an error.
    async fn fetch(&self, params: &ScanParams) -> Result<ScanResult, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_every_kind() {
        for kind in SourceKind::ALL {
            assert_eq!(kind.as_str().parse::<SourceKind>().unwrap(), kind);
        }
        assert_eq!("YouTube".parse::<SourceKind>().unwrap(), SourceKind::Youtube);
        assert!("myspace".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_aggregate_order_is_fixed() {
        let names: Vec<&str> = SourceKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names, ["reddit", "twitter", "youtube", "gnews", "newsapi"]);
    }
}
