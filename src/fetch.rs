//! HTTP fetch collaborator.
//!
//! The pipeline only needs two things from the network: the text of a feed
//! and a [`DetailPage`] for an article URL. Both go through the
//! [`PageFetcher`] trait so the orchestration can be driven by an in-memory
//! double in tests.
//!
//! Retries are deliberately absent: a failed fetch drops the item.

use crate::error::CrawlError;
use crate::models::DetailPage;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Browser-like user agent; Yahoo serves a reduced page to unknown clients.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Trait for fetching documents over the network.
///
/// Implementors return the final URL and raw body of a resource. The
/// pipeline never mutates what it gets back.
pub trait PageFetcher {
    /// Fetch an HTML page.
    async fn fetch_page(&self, url: &str) -> Result<DetailPage, CrawlError>;

    /// Fetch the raw text of a feed.
    async fn fetch_feed(&self, url: &str) -> Result<String, CrawlError> {
        self.fetch_page(url).await.map(|page| page.raw_text)
    }
}

/// [`PageFetcher`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client with the given timeout and user agent.
    pub fn build_client(timeout: Duration, user_agent: &str) -> Result<reqwest::Client, CrawlError> {
        Ok(reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?)
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_page(&self, url: &str) -> Result<DetailPage, CrawlError> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Non-success response");
            return Err(CrawlError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let final_url = response.url().to_string();
        let body = response.text().await?;
        debug!(
            %final_url,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(DetailPage::new(final_url, body))
    }
}
