//! CSV output of finished records.
//!
//! The file opens cleanly in Excel with Traditional Chinese text: it starts
//! with a UTF-8 byte order mark, uses CRLF line endings, and has a fixed
//! header row. Fields are quoted only when they contain a comma, a quote or
//! a line break.

use crate::error::CrawlError;
use crate::models::FinishedRecord;
use csv::{Terminator, WriterBuilder};
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// UTF-8 byte order mark.
pub const BOM: &str = "\u{feff}";

/// Header row: title, link, author, date.
pub const HEADERS: [&str; 4] = ["標題", "連結", "作者", "日期"];

/// Render records as CSV text, BOM and header included.
pub fn render(records: &[FinishedRecord]) -> Result<String, CrawlError> {
    let mut wtr = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(BOM.as_bytes().to_vec());

    wtr.write_record(HEADERS)?;
    for r in records {
        wtr.write_record([&r.title, &r.link, &r.author, &r.date])?;
    }

    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

/// Write records to `path` as CSV, replacing any existing file.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = records.len()))]
pub async fn write_records(records: &[FinishedRecord], path: &Path) -> Result<(), CrawlError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, render(records)?).await?;
    info!("Wrote CSV records");
    Ok(())
}
