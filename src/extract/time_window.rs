//! Publish-time extraction and the recency admission check.
//!
//! The article's publish time is read from the first `<time datetime="…">`
//! attribute on the page. Yahoo serves it as RFC 3339 with a trailing `Z`;
//! other offsets and fractional seconds are accepted too. The result is
//! converted to UTC+8 before it is compared against the run's
//! [`RecencyWindow`].

use crate::models::{taipei_offset, DetailPage, PublishMoment, RecencyWindow};
use chrono::{DateTime, NaiveDateTime, TimeZone};
use once_cell::sync::Lazy;
use scraper::Selector;
use tracing::trace;

static TIME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("time[datetime]").expect("valid time selector"));

/// ISO-8601 layouts with an explicit offset that RFC 3339 parsing rejects:
/// minute precision and basic (`+0000`) offsets.
const OFFSET_LAYOUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Naive ISO-8601 layouts accepted when the value carries no offset.
const NAIVE_LAYOUTS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"];

/// Whether `moment` falls inside `window`, inclusive at both ends.
pub fn admit(moment: &PublishMoment, window: &RecencyWindow) -> bool {
    window.start <= *moment && *moment <= window.end
}

/// Parse an ISO-8601 timestamp and normalize it to UTC+8.
///
/// Values with an explicit offset (including `Z`) are converted. Values with
/// no offset are taken to already be local (UTC+8) time.
///
/// # Returns
///
/// `None` if the string is not a recognizable ISO-8601 datetime.
pub fn parse_publish_moment(raw: &str) -> Option<PublishMoment> {
    let raw = raw.trim();
    let tz = taipei_offset();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&tz));
    }

    let zoned = match raw.strip_suffix(['Z', 'z']) {
        Some(stem) => format!("{stem}+00:00"),
        None => raw.to_string(),
    };
    if let Some(dt) = OFFSET_LAYOUTS
        .iter()
        .find_map(|layout| DateTime::parse_from_str(&zoned, layout).ok())
    {
        return Some(dt.with_timezone(&tz));
    }

    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .and_then(|naive| tz.from_local_datetime(&naive).single())
}

/// Read the publish moment of a detail page.
///
/// # Returns
///
/// `None` when the page has no `<time datetime>` attribute or when its value
/// does not parse. Both are ordinary for non-article pages and are not logged
/// above `trace`.
pub fn publish_moment(page: &DetailPage) -> Option<PublishMoment> {
    let document = page.document();
    let raw = document
        .select(&TIME_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("datetime"))?;

    let parsed = parse_publish_moment(raw);
    if parsed.is_none() {
        trace!(url = %page.url, raw, "Unparseable publish time");
    }
    parsed
}
