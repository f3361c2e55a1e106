use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::sources::{SourceError, SourceKind};

/// Reddit "script" app credentials (password grant).
#[derive(Debug, Clone, Default)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy. Missing credentials
/// are not an error here. Each source checks its own with a
/// `require_*` call when it is constructed, so one unconfigured
/// platform never blocks the others.
#[derive(Debug, Clone)]
pub struct Config {
    pub reddit: RedditCredentials,
    /// X/Twitter API v2 app-only bearer token
    pub twitter_bearer_token: String,
    /// YouTube Data API v3 key
    pub youtube_api_key: String,
    /// GNews v4 API token
    pub gnews_api_key: String,
    /// NewsAPI.org key
    pub newsapi_key: String,
    /// Default item ceilings per platform when a caller gives no `limit`
    pub reddit_post_limit: u32,
    pub twitter_max_tweets: u32,
    pub youtube_max_results: u32,
    pub news_max_articles: u32,
    /// Applied to every upstream request, including comment sub-fetches
    pub http_timeout: Duration,
    /// Only content from the last N days is requested where the API supports it
    pub freshness_days: i64,
    /// HTTP listen port (PORT env var)
    pub port: u16,
    /// HTTP bind address (VIGIL_BIND env var)
    pub bind: String,
}

pub const DEFAULT_REDDIT_USER_AGENT: &str = "vigil/0.1 (harassment-monitor)";

/// Upper bound for `VIGIL_FRESHNESS_DAYS`. The lower bound is one day.
pub const MAX_FRESHNESS_DAYS: i64 = 365;

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// `load` passes the process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str| lookup(key).unwrap_or_default();

        let freshness_days: i64 = parse_or(&lookup, "VIGIL_FRESHNESS_DAYS", 7)?;
        if !(1..=MAX_FRESHNESS_DAYS).contains(&freshness_days) {
            bail!(
                "VIGIL_FRESHNESS_DAYS must be between 1 and {MAX_FRESHNESS_DAYS}, got {freshness_days}"
            );
        }
        let timeout_secs: u64 = parse_or(&lookup, "VIGIL_HTTP_TIMEOUT_SECS", 30)?;
        if timeout_secs == 0 {
            bail!("VIGIL_HTTP_TIMEOUT_SECS must be at least 1");
        }

        Ok(Self {
            reddit: RedditCredentials {
                client_id: string("REDDIT_CLIENT_ID"),
                client_secret: string("REDDIT_CLIENT_SECRET"),
                username: string("REDDIT_USERNAME"),
                password: string("REDDIT_PASSWORD"),
                user_agent: lookup("REDDIT_USER_AGENT")
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| DEFAULT_REDDIT_USER_AGENT.to_string()),
            },
            twitter_bearer_token: string("TWITTER_BEARER_TOKEN"),
            youtube_api_key: string("YOUTUBE_API_KEY"),
            gnews_api_key: string("GNEWS_API_KEY"),
            newsapi_key: string("NEWSAPI_KEY"),
            reddit_post_limit: parse_or(&lookup, "REDDIT_POST_LIMIT", 10)?,
            twitter_max_tweets: parse_or(&lookup, "TWITTER_MAX_TWEETS", 50)?,
            youtube_max_results: parse_or(&lookup, "YOUTUBE_MAX_RESULTS", 20)?,
            news_max_articles: parse_or(&lookup, "NEWS_MAX_ARTICLES", 20)?,
            http_timeout: Duration::from_secs(timeout_secs),
            freshness_days,
            port: parse_or(&lookup, "PORT", 5000)?,
            bind: lookup("VIGIL_BIND")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "0.0.0.0".to_string()),
        })
    }

    /// The item ceiling a source uses when the caller doesn't pass one.
    pub fn default_limit(&self, kind: SourceKind) -> u32 {
        match kind {
            SourceKind::Reddit => self.reddit_post_limit,
            SourceKind::Twitter => self.twitter_max_tweets,
            SourceKind::Youtube => self.youtube_max_results,
            SourceKind::Gnews | SourceKind::Newsapi => self.news_max_articles,
        }
    }

    /// Check that all four Reddit credentials are configured.
    pub fn require_reddit(&self) -> Result<(), SourceError> {
        let missing: Vec<&str> = [
            ("REDDIT_CLIENT_ID", &self.reddit.client_id),
            ("REDDIT_CLIENT_SECRET", &self.reddit.client_secret),
            ("REDDIT_USERNAME", &self.reddit.username),
            ("REDDIT_PASSWORD", &self.reddit.password),
        ]
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(key, _)| *key)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(not_configured(&missing.join(", ")))
        }
    }

    pub fn require_twitter(&self) -> Result<(), SourceError> {
        require("TWITTER_BEARER_TOKEN", &self.twitter_bearer_token)
    }

    pub fn require_youtube(&self) -> Result<(), SourceError> {
        require("YOUTUBE_API_KEY", &self.youtube_api_key)
    }

    pub fn require_gnews(&self) -> Result<(), SourceError> {
        require("GNEWS_API_KEY", &self.gnews_api_key)
    }

    pub fn require_newsapi(&self) -> Result<(), SourceError> {
        require("NEWSAPI_KEY", &self.newsapi_key)
    }

    /// Credential check for any source, used by `vigil status`.
    pub fn require_source(&self, kind: SourceKind) -> Result<(), SourceError> {
        match kind {
            SourceKind::Reddit => self.require_reddit(),
            SourceKind::Twitter => self.require_twitter(),
            SourceKind::Youtube => self.require_youtube(),
            SourceKind::Gnews => self.require_gnews(),
            SourceKind::Newsapi => self.require_newsapi(),
        }
    }
}

fn require(key: &str, value: &str) -> Result<(), SourceError> {
    if value.is_empty() {
        return Err(not_configured(key));
    }
    Ok(())
}

fn not_configured(keys: &str) -> SourceError {
    SourceError::Configuration(format!(
        "{keys} not set. Add it to your .env file. See .env.example for the required variables."
    ))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {raw:?}")),
        None => Ok(default),
    }
}
