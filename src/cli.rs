//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Crawl tuning (feeds, window, timeouts, shorteners) lives in the YAML
//! config; the CLI covers where things are read from and written to.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the crawler.
///
/// # Examples
///
/// ```sh
/// # Last hour of Yahoo TW news into a CSV
/// yahoo_tw_news -o news.csv
///
/// # Also write JSON, with a custom config
/// yahoo_tw_news -o news.csv -j news.json -c crawler.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output CSV file (UTF-8 with BOM)
    #[arg(short, long, default_value = "yahoo_news.csv")]
    pub output: PathBuf,

    /// Optional JSON output file
    #[arg(short, long)]
    pub json_output: Option<PathBuf>,

    /// Directory for diagnostic dumps of pages without an author
    #[arg(long, default_value = "logs")]
    pub logs_dir: PathBuf,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "YAHOO_TW_NEWS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the number of articles processed at once
    #[arg(long)]
    pub concurrency: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["yahoo_tw_news"]);
        assert_eq!(cli.output, PathBuf::from("yahoo_news.csv"));
        assert_eq!(cli.logs_dir, PathBuf::from("logs"));
        assert!(cli.json_output.is_none());
        assert!(cli.concurrency.is_none());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "yahoo_tw_news",
            "-o",
            "/tmp/news.csv",
            "-j",
            "/tmp/news.json",
            "-c",
            "/tmp/crawler.yaml",
        ]);

        assert_eq!(cli.output, PathBuf::from("/tmp/news.csv"));
        assert_eq!(cli.json_output, Some(PathBuf::from("/tmp/news.json")));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/crawler.yaml")));
    }

    #[test]
    fn test_cli_long_flags() {
        let cli = Cli::parse_from([
            "yahoo_tw_news",
            "--logs-dir",
            "/var/log/news",
            "--concurrency",
            "3",
        ]);
        assert_eq!(cli.logs_dir, PathBuf::from("/var/log/news"));
        assert_eq!(cli.concurrency, Some(3));
    }
}
