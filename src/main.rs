//! # Yahoo TW News
//!
//! Collects the last hour of news from Yahoo Taiwan's RSS feeds and writes
//! one row per article: title, short link, author and publish time.
//!
//! ## Features
//!
//! - Reads the Yahoo Taiwan news and stock feeds (or any RSS list from config)
//! - Keeps only articles published inside a recency window ending at start-up
//! - Identifies the partner publisher behind each syndicated article
//! - Follows TVBS stubs to the TVBS site to find the real byline
//! - Resolves authors from JSON-LD, byline markup, meta tags or body text,
//!   with per-publisher defaults
//! - Shortens links through TinyURL or is.gd, falling back to the long URL
//!
//! ## Usage
//!
//! ```sh
//! yahoo_tw_news -o news.csv -j news.json
//! ```
//!
//! ## Architecture
//!
//! 1. **Discovery**: Read every feed and drop repeated links
//! 2. **Extraction**: Fetch each article, check its publish time, classify it,
//!    follow stubs, resolve the author
//! 3. **Shortening**: Memoized shortener with provider failover
//! 4. **Output**: CSV (UTF-8 with BOM) and optional JSON

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod config;
mod dedup;
mod error;
mod extract;
mod feed;
mod fetch;
mod models;
mod outputs;
mod pipeline;
mod shortener;
mod utils;

use cli::Cli;
use config::CrawlerConfig;
use fetch::HttpFetcher;
use models::RecencyWindow;
use pipeline::IngestionPipeline;
use shortener::LinkShortener;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("yahoo_tw_news starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.output, ?args.json_output, ?args.logs_dir, "Parsed CLI arguments");

    let mut config = CrawlerConfig::load(args.config.as_deref()).await?;
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency.max(1);
    }

    // Dumps must have somewhere to land before the first article is processed
    if let Err(e) = ensure_writable_dir(&args.logs_dir).await {
        error!(
            path = %args.logs_dir.display(),
            error = %e,
            "Logs directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    // The window is fixed here, before any network traffic.
    let window = RecencyWindow::last(config.window());

    let client = HttpFetcher::build_client(config.fetch_timeout(), &config.user_agent)?;
    let shortener = LinkShortener::new(
        client.clone(),
        config.shorteners.clone(),
        config.shorten_timeout(),
    );
    let pipeline = IngestionPipeline::new(HttpFetcher::new(client), window, shortener, &args.logs_dir)
        .with_concurrency(config.concurrency);
    info!(
        start = %pipeline.window().start,
        end = %pipeline.window().end,
        feeds = config.feeds.len(),
        "Recency window fixed"
    );

    let report = pipeline.run(&config.feeds).await;

    outputs::csv::write_records(&report.records, &args.output).await?;
    if let Some(json_path) = &args.json_output {
        if let Err(e) = outputs::json::write_records(&report.records, json_path).await {
            error!(path = %json_path.display(), error = %e, "Failed to write JSON");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        records = report.records.len(),
        discovered = report.discovered,
        seen_links = pipeline.dedup().len(),
        output = %args.output.display(),
        "Execution complete"
    );

    Ok(())
}
