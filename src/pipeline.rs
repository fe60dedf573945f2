//! Per-item orchestration of the crawl.
//!
//! Each feed item walks a fixed sequence of gates:
//!
//! ```text
//! Discovered → Deduped → Fetched → TimeFiltered → Classified
//!            → [Redirected] → Authored → Shortened → Emitted
//! ```
//!
//! Any gate may answer with a [`Rejection`], which ends that item quietly.
//! Rejections are expected outcomes (old news, repeated links, pages without
//! a timestamp) and never abort the run.
//!
//! # State
//!
//! The pipeline owns everything that lives for one run: the
//! [`RecencyWindow`] fixed at construction, the [`DedupTracker`], and the
//! [`LinkShortener`] cache. Nothing is process-global.

use crate::dedup::DedupTracker;
use crate::extract::{author, redirect, source, time_window};
use crate::feed::parse_feed;
use crate::fetch::PageFetcher;
use crate::models::{DetailPage, FeedItem, FinishedRecord, RecencyWindow};
use crate::shortener::LinkShortener;
use crate::utils::dump_page;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Default number of items processed at once.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Why an item produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The feed entry had no `<link>`.
    MissingLink,
    /// The link was already dispatched earlier in this run.
    Duplicate,
    /// The detail page could not be fetched.
    FetchFailed(String),
    /// The page has no `<time datetime>` or its value does not parse.
    NoPublishTime,
    /// The publish time is outside the recency window.
    OutsideWindow,
    /// The original publisher page could not be fetched.
    RedirectFailed(String),
}

impl Rejection {
    /// Short stable name used as a counter key in run summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::MissingLink => "missing_link",
            Rejection::Duplicate => "duplicate",
            Rejection::FetchFailed(_) => "fetch_failed",
            Rejection::NoPublishTime => "no_publish_time",
            Rejection::OutsideWindow => "outside_window",
            Rejection::RedirectFailed(_) => "redirect_failed",
        }
    }
}

/// A feed item that passed discovery: it has a link seen for the first time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovered {
    pub title: String,
    pub link: String,
}

/// Outcome of [`IngestionPipeline::run`].
#[derive(Debug, Default)]
pub struct RunReport {
    /// Emitted records, in feed discovery order.
    pub records: Vec<FinishedRecord>,
    /// Feed entries read across all feeds.
    pub discovered: usize,
    /// Feeds that could not be fetched or parsed.
    pub failed_feeds: usize,
    /// Dropped items per [`Rejection::kind`].
    pub dropped: BTreeMap<&'static str, usize>,
}

impl RunReport {
    fn record_drop(&mut self, rejection: &Rejection) {
        *self.dropped.entry(rejection.kind()).or_default() += 1;
    }

    pub fn dropped_total(&self) -> usize {
        self.dropped.values().sum()
    }
}

/// Turns feed items into [`FinishedRecord`]s.
pub struct IngestionPipeline<F> {
    fetcher: F,
    window: RecencyWindow,
    dedup: DedupTracker,
    shortener: LinkShortener,
    logs_dir: PathBuf,
    concurrency: usize,
}

impl<F: PageFetcher> IngestionPipeline<F> {
    /// Create a pipeline for one run.
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Source of feed and article documents
    /// * `window` - Admission window, fixed for the pipeline's lifetime
    /// * `shortener` - Link shortener; its cache lives as long as the pipeline
    /// * `logs_dir` - Where pages without a resolvable author are dumped
    pub fn new(
        fetcher: F,
        window: RecencyWindow,
        shortener: LinkShortener,
        logs_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            window,
            dedup: DedupTracker::new(),
            shortener,
            logs_dir: logs_dir.into(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set how many items may be in flight at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn window(&self) -> &RecencyWindow {
        &self.window
    }

    pub fn dedup(&self) -> &DedupTracker {
        &self.dedup
    }

    /// Crawl every feed and process the items they list.
    ///
    /// Feeds are read in order and their items deduplicated in discovery
    /// order. Admitted items are then processed concurrently, bounded by the
    /// configured concurrency, and records are returned in discovery order.
    /// A feed that fails to load is logged and skipped.
    #[instrument(level = "info", skip_all, fields(feeds = feeds.len()))]
    pub async fn run(&self, feeds: &[String]) -> RunReport {
        let t0 = Instant::now();
        let mut report = RunReport::default();
        let mut admitted = Vec::new();

        for feed_url in feeds {
            let items = match self.load_feed(feed_url).await {
                Ok(items) => items,
                Err(e) => {
                    warn!(feed = %feed_url, error = %e, "Skipping feed");
                    report.failed_feeds += 1;
                    continue;
                }
            };
            info!(feed = %feed_url, count = items.len(), "Read feed items");

            for item in items {
                report.discovered += 1;
                match self.discover(item) {
                    Ok(discovered) => admitted.push(discovered),
                    Err(rejection) => report.record_drop(&rejection),
                }
            }
        }

        let results: Vec<Result<FinishedRecord, Rejection>> = stream::iter(admitted)
            .map(|item| self.process(item))
            .buffered(self.concurrency)
            .collect()
            .await;

        for result in results {
            match result {
                Ok(record) => report.records.push(record),
                Err(rejection) => report.record_drop(&rejection),
            }
        }

        info!(
            discovered = report.discovered,
            emitted = report.records.len(),
            dropped = report.dropped_total(),
            failed_feeds = report.failed_feeds,
            breakdown = ?report.dropped,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Crawl finished"
        );
        report
    }

    async fn load_feed(&self, feed_url: &str) -> Result<Vec<FeedItem>, crate::error::CrawlError> {
        let xml = self.fetcher.fetch_feed(feed_url).await?;
        parse_feed(&xml)
    }

    /// Admit a raw feed item: it needs a link not seen before in this run.
    pub fn discover(&self, item: FeedItem) -> Result<Discovered, Rejection> {
        let link = item.link.ok_or(Rejection::MissingLink)?;
        if !self.dedup.first_sighting(&link) {
            debug!(%link, "Duplicate link");
            return Err(Rejection::Duplicate);
        }
        Ok(Discovered {
            title: item.title.unwrap_or_default(),
            link,
        })
    }

    /// Process one discovered item into a record.
    ///
    /// At most two fetches happen: the detail page, and for syndication
    /// stubs the original publisher page. The publish time always comes from
    /// the first page.
    #[instrument(level = "debug", skip_all, fields(link = %item.link))]
    pub async fn process(&self, item: Discovered) -> Result<FinishedRecord, Rejection> {
        let page = self.fetcher.fetch_page(&item.link).await.map_err(|e| {
            warn!(link = %item.link, error = %e, "Detail fetch failed");
            Rejection::FetchFailed(e.to_string())
        })?;

        let published = time_window::publish_moment(&page).ok_or(Rejection::NoPublishTime)?;
        if !time_window::admit(&published, &self.window) {
            debug!(%published, "Outside recency window");
            return Err(Rejection::OutsideWindow);
        }

        let source = source::classify(&page);
        let page = self.follow_redirect(&source, page).await?;

        let byline = author::resolve(&page, &source);
        if byline.is_fallback() {
            self.dump_unresolved(&page).await;
        }

        let link = self.shortener.shorten(&item.link).await;
        debug!(%source, author = %byline.name, strategy = ?byline.strategy, "Emitting record");
        Ok(FinishedRecord::new(item.title, link, byline.name, &published))
    }

    /// Swap a syndication stub for the original publisher page when one is linked.
    async fn follow_redirect(&self, source: &str, page: DetailPage) -> Result<DetailPage, Rejection> {
        if !redirect::needs_redirect(source) {
            return Ok(page);
        }
        let Some(target) = redirect::find_original_url(&page) else {
            debug!(url = %page.url, "No original link on stub; using stub page");
            return Ok(page);
        };

        debug!(%target, "Following syndication stub");
        self.fetcher.fetch_page(&target).await.map_err(|e| {
            warn!(%target, error = %e, "Original page fetch failed");
            Rejection::RedirectFailed(e.to_string())
        })
    }

    /// Best-effort dump of a page whose author could not be found.
    async fn dump_unresolved(&self, page: &DetailPage) {
        match dump_page(&self.logs_dir, &page.raw_text).await {
            Ok(path) => warn!(url = %page.url, dump = %path.display(), "No author found; page dumped"),
            Err(e) => warn!(url = %page.url, error = %e, "No author found; dump failed"),
        }
    }
}
