//! Utility functions for logging, diagnostics and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - String truncation for log fields
//! - Diagnostic page dumps for pages whose author could not be found
//! - File system validation for output directories

use crate::error::CrawlError;
use crate::models::now_in_taipei;
use std::fs as stdfs;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Prefix of diagnostic dump files.
pub const DUMP_PREFIX: &str = "no_author_";

/// Truncate a string for logging purposes.
///
/// Long strings are cut after `max` characters with an ellipsis and a count of
/// the bytes dropped. Cuts always land on a character boundary, so CJK text
/// is safe to pass.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// File name for a diagnostic dump taken now.
///
/// The timestamp is UTC+8 with millisecond precision so that several misses
/// inside the same second do not overwrite each other.
pub fn dump_file_name() -> String {
    format!(
        "{DUMP_PREFIX}{}.html",
        now_in_taipei().format("%Y%m%d_%H%M%S_%3f")
    )
}

/// Write a page body into `logs_dir` for offline inspection.
///
/// # Returns
///
/// The path written, or the IO error. Callers treat failure as non-fatal.
#[instrument(level = "debug", skip(body), fields(bytes = body.len()))]
pub async fn dump_page(logs_dir: &Path, body: &str) -> Result<PathBuf, CrawlError> {
    let path = logs_dir.join(dump_file_name());
    fs::write(&path, body).await?;
    Ok(path)
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), CrawlError> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Directory is writable");
    Ok(())
}
