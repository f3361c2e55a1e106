// Source registry: builds each adapter at most once per process.
//
// Construction only fails on missing credentials, and credentials don't
// change while the process runs, so a failure is cached as well and the
// source stays unavailable until restart.

use std::sync::{Arc, OnceLock};

use tracing::{error, info};

use crate::config::Config;
use crate::sources::gnews::GnewsSource;
use crate::sources::newsapi::NewsapiSource;
use crate::sources::reddit::RedditSource;
use crate::sources::twitter::TwitterSource;
use crate::sources::youtube::YoutubeSource;
use crate::sources::{Source, SourceError, SourceKind};

/// Hands out ready-to-use sources. The HTTP layer and the CLI depend on
/// this rather than on concrete adapters, so tests can swap in fakes.
pub trait SourceProvider: Send + Sync {
    fn get_source(&self, kind: SourceKind) -> Result<Arc<dyn Source>, SourceError>;
}

type Slot = OnceLock<Result<Arc<dyn Source>, String>>;

/// Lazily memoized registry backed by real adapters.
pub struct SourceRegistry {
    config: Arc<Config>,
    slots: [Slot; 5],
}

impl SourceRegistry {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            slots: std::array::from_fn(|_| OnceLock::new()),
        }
    }
}

impl SourceProvider for SourceRegistry {
    fn get_source(&self, kind: SourceKind) -> Result<Arc<dyn Source>, SourceError> {
        let slot = &self.slots[slot_index(kind)];
        let built = slot.get_or_init(|| match build_source(kind, &self.config) {
            Ok(source) => {
                info!(source = kind.as_str(), "Source initialized");
                Ok(source)
            }
            Err(e) => {
                error!(source = kind.as_str(), error = %e, "Failed to initialize source");
                Err(e.to_string())
            }
        });

        match built {
            Ok(source) => Ok(Arc::clone(source)),
            Err(reason) => Err(SourceError::Configuration(reason.clone())),
        }
    }
}

/// Construct the real adapter for `kind`.
pub fn build_source(kind: SourceKind, config: &Config) -> Result<Arc<dyn Source>, SourceError> {
    Ok(match kind {
        SourceKind::Reddit => Arc::new(RedditSource::new(config)?),
        SourceKind::Twitter => Arc::new(TwitterSource::new(config)?),
        SourceKind::Youtube => Arc::new(YoutubeSource::new(config)?),
        SourceKind::Gnews => Arc::new(GnewsSource::new(config)?),
        SourceKind::Newsapi => Arc::new(NewsapiSource::new(config)?),
    })
}

fn slot_index(kind: SourceKind) -> usize {
    match kind {
        SourceKind::Reddit => 0,
        SourceKind::Twitter => 1,
        SourceKind::Youtube => 2,
        SourceKind::Gnews => 3,
        SourceKind::Newsapi => 4,
    }
}
