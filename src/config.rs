//! Crawler configuration loaded from an optional YAML file.
//!
//! Every key has a default, so an empty file (or no file at all) yields the
//! stock Yahoo Taiwan setup. Duplicate feed URLs are removed while keeping
//! the first occurrence.
//!
//! ```yaml
//! feeds:
//!   - https://tw.news.yahoo.com/rss
//! window_minutes: 60
//! shorten_timeout_secs: 4
//! shorteners:
//!   - name: tinyurl
//!     endpoint: "https://tinyurl.com/api-create.php?url={url}"
//! ```

use crate::error::CrawlError;
use crate::fetch::DEFAULT_USER_AGENT;
use crate::pipeline::DEFAULT_CONCURRENCY;
use crate::shortener::{ShortenProvider, DEFAULT_TIMEOUT};
use itertools::Itertools;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// Feeds crawled when the config does not list any.
pub const DEFAULT_FEEDS: [&str; 7] = [
    "https://tw.news.yahoo.com/rss",
    "https://tw.news.yahoo.com/rss/politics",
    "https://tw.news.yahoo.com/rss/world",
    "https://tw.news.yahoo.com/rss/finance",
    "https://tw.news.yahoo.com/rss/society",
    "https://tw.news.yahoo.com/rss/tech",
    "https://tw.stock.yahoo.com/rss",
];

/// Runtime settings for one crawl.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// RSS feed URLs, crawled in order.
    pub feeds: Vec<String>,
    /// Length of the recency window ending at start-up.
    pub window_minutes: u32,
    /// Timeout for feed and article fetches.
    pub fetch_timeout_secs: u64,
    /// Timeout for each shortening provider attempt.
    pub shorten_timeout_secs: u64,
    /// Maximum number of articles processed at once.
    pub concurrency: usize,
    pub user_agent: String,
    /// Shortening services, tried in order.
    pub shorteners: Vec<ShortenProvider>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            feeds: DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect(),
            window_minutes: 60,
            fetch_timeout_secs: 15,
            shorten_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            concurrency: DEFAULT_CONCURRENCY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            shorteners: ShortenProvider::defaults(),
        }
    }
}

impl CrawlerConfig {
    /// Parse a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, CrawlError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        Ok(config.normalized())
    }

    /// Load from `path`, or the defaults when `path` is `None`.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&Path>) -> Result<Self, CrawlError> {
        let config = match path {
            Some(path) => {
                let yaml = tokio::fs::read_to_string(path).await?;
                Self::from_yaml(&yaml)?
            }
            None => Self::default(),
        };
        info!(
            feeds = config.feeds.len(),
            window_minutes = config.window_minutes,
            concurrency = config.concurrency,
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.window_minutes))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn shorten_timeout(&self) -> Duration {
        Duration::from_secs(self.shorten_timeout_secs)
    }

    fn normalized(mut self) -> Self {
        self.feeds = self
            .feeds
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .unique()
            .collect();
        if self.feeds.is_empty() {
            self.feeds = Self::default().feeds;
        }
        self.concurrency = self.concurrency.max(1);
        self
    }
}
