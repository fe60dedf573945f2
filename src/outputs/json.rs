//! JSON output of finished records.
//!
//! Records are written as a pretty-printed array, in the order the crawl
//! emitted them:
//!
//! ```json
//! [
//!   {
//!     "title": "颱風動態 最新路徑",
//!     "link": "https://tinyurl.com/abc",
//!     "author": "記者陳大文",
//!     "date": "2025-05-06 14:30"
//!   }
//! ]
//! ```

use crate::error::CrawlError;
use crate::models::FinishedRecord;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write records to `path` as JSON, creating parent directories as needed.
///
/// # Returns
///
/// `Ok(())` on success, or an error if directory creation or file writing fails.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = records.len()))]
pub async fn write_records(records: &[FinishedRecord], path: &Path) -> Result<(), CrawlError> {
    let json = serde_json::to_string_pretty(records)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!("Wrote JSON records");
    Ok(())
}
