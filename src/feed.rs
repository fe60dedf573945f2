//! RSS 2.0 feed parsing.
//!
//! Only `title` and `link` of each `<item>` are read; everything else in the
//! channel is ignored. Values are trimmed and blank values become `None`.

use crate::error::CrawlError;
use crate::models::FeedItem;
use quick_xml::de::from_str;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<FeedItem>,
}

/// Parse an RSS document into its items, in feed order.
///
/// # Errors
///
/// Returns [`CrawlError::Feed`] if the XML is malformed or has no `<channel>`.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>, CrawlError> {
    let rss: Rss = from_str(xml)?;
    Ok(rss.channel.items.into_iter().map(clean).collect())
}

fn clean(item: FeedItem) -> FeedItem {
    let tidy = |v: Option<String>| {
        v.map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    FeedItem {
        title: tidy(item.title),
        link: tidy(item.link),
    }
}
