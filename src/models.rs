//! Data models flowing through the ingestion pipeline.
//!
//! This module defines the core data structures used throughout the application:
//! - [`FeedItem`]: A raw `<item>` entry from an RSS feed
//! - [`DetailPage`]: A fetched article page (final URL plus raw HTML)
//! - [`RecencyWindow`]: The admission interval computed once per run
//! - [`FinishedRecord`]: The only thing the pipeline emits
//!
//! All times are carried as [`PublishMoment`], a timestamp pinned to the
//! fixed UTC+8 offset used by Taiwanese newsrooms.

use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};
use scraper::Html;
use serde::{Deserialize, Serialize};

/// Seconds east of UTC for every timestamp the crawler produces.
pub const TAIPEI_OFFSET_SECS: i32 = 8 * 3600;

/// Display format of [`FinishedRecord::date`].
pub const RECORD_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A publish timestamp normalized to UTC+8.
pub type PublishMoment = DateTime<FixedOffset>;

/// The fixed UTC+8 offset.
pub fn taipei_offset() -> FixedOffset {
    // 8h is always inside the ±24h range FixedOffset accepts.
    FixedOffset::east_opt(TAIPEI_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Current time at UTC+8.
pub fn now_in_taipei() -> PublishMoment {
    Utc::now().with_timezone(&taipei_offset())
}

/// A raw news entry as read from an RSS feed.
///
/// Both fields are optional because real feeds occasionally omit them.
/// Items without a link are dropped at discovery time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeedItem {
    /// The headline, carried through to the record unchanged.
    pub title: Option<String>,
    /// The article URL; also the dedup key.
    pub link: Option<String>,
}

/// A fetched article page.
///
/// Holds the final URL (after HTTP redirects) and the raw body. The DOM is
/// parsed on demand with [`DetailPage::document`], since `scraper::Html` is
/// not cheap to keep around for every in-flight item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPage {
    /// The URL the page was ultimately served from.
    pub url: String,
    /// The raw HTML as received.
    pub raw_text: String,
}

impl DetailPage {
    pub fn new(url: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            raw_text: raw_text.into(),
        }
    }

    /// Parse the raw body into a queryable HTML document.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.raw_text)
    }

    /// Host portion of [`DetailPage::url`], lower-cased, if the URL parses.
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
    }
}

/// The admission interval for publish times, inclusive at both ends.
///
/// Computed once when the pipeline starts and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyWindow {
    pub start: PublishMoment,
    pub end: PublishMoment,
}

impl RecencyWindow {
    /// The window `[end - length, end]`.
    pub fn ending_at(end: PublishMoment, length: Duration) -> Self {
        Self {
            start: end - length,
            end,
        }
    }

    /// The window of the given length ending now (UTC+8).
    pub fn last(length: Duration) -> Self {
        Self::ending_at(now_in_taipei(), length)
    }
}

/// A fully processed news item, ready for export.
///
/// Field order is the export column order: title, link, author, date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishedRecord {
    /// Headline from the feed (empty when the feed omitted it).
    pub title: String,
    /// Shortened link, or the original feed link if shortening failed.
    pub link: String,
    /// Resolved byline; never empty.
    pub author: String,
    /// Publish time formatted as `YYYY-MM-DD HH:MM` at UTC+8.
    pub date: String,
}

impl FinishedRecord {
    pub fn new(title: String, link: String, author: String, published: &PublishMoment) -> Self {
        Self {
            title,
            link,
            author,
            date: published.format(RECORD_DATE_FORMAT).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_window_spans_requested_length() {
        let end = taipei_offset()
            .with_ymd_and_hms(2025, 5, 6, 14, 30, 0)
            .unwrap();
        let window = RecencyWindow::ending_at(end, Duration::hours(1));
        assert_eq!(window.end, end);
        assert_eq!(window.start, end - Duration::hours(1));
    }

    #[test]
    fn test_now_in_taipei_uses_fixed_offset() {
        assert_eq!(now_in_taipei().offset().local_minus_utc(), TAIPEI_OFFSET_SECS);
    }

    #[test]
    fn test_record_date_format() {
        let moment = taipei_offset()
            .with_ymd_and_hms(2025, 1, 2, 3, 4, 59)
            .unwrap();
        let record = FinishedRecord::new(
            "標題".to_string(),
            "https://tinyurl.com/abc".to_string(),
            "記者陳大文".to_string(),
            &moment,
        );
        assert_eq!(record.date, "2025-01-02 03:04");
    }

    #[test]
    fn test_detail_page_host() {
        let page = DetailPage::new("https://News.TVBS.com.tw/politics/1", "");
        assert_eq!(page.host().as_deref(), Some("news.tvbs.com.tw"));
        assert_eq!(DetailPage::new("not a url", "").host(), None);
    }

    #[test]
    fn test_finished_record_serialization() {
        let record = FinishedRecord {
            title: "t".to_string(),
            link: "l".to_string(),
            author: "a".to_string(),
            date: "2025-05-06 20:30".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"title":"t","link":"l","author":"a","date":"2025-05-06 20:30"}"#
        );
    }
}
