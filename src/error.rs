//! Error types for the collaborators around the extraction core.
//!
//! Filtering outcomes (duplicates, stale items, missing timestamps) are not
//! errors and live in [`crate::pipeline::Rejection`]. Everything here is a real
//! failure of an outside system: the network, the filesystem, or a malformed
//! feed or config file.

use thiserror::Error;

/// Failures raised by fetching, feed parsing, config loading and output.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Network-level error (DNS, connection, TLS, timeout)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {status} for {url}")]
    HttpStatus { status: u16, url: String },
    /// A 2xx response whose body was not what the caller expected
    #[error("Unexpected response body: {0}")]
    UnexpectedBody(String),
    /// Feed XML could not be deserialized as RSS 2.0
    #[error("Feed parse error: {0}")]
    Feed(#[from] quick_xml::de::DeError),
    /// Config file is not valid YAML for [`crate::config::CrawlerConfig`]
    #[error("Invalid config file: {0}")]
    Config(#[from] serde_yaml::Error),
    /// A record could not be written as CSV
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("Serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
