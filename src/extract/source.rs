//! Publisher classification for syndicated Yahoo pages.
//!
//! Yahoo republishes wire and partner content; the label returned here
//! decides the redirect path and the fallback byline.
//!
//! # Resolution Order
//!
//! 1. Provider logo `alt` text (`div.caas-attr-provider-logo img`)
//! 2. Attribution line (`div.caas-attr-meta`), the segment after the last `｜`
//! 3. Substring table over the lower-cased page URL
//! 4. [`UNKNOWN_SOURCE`]

use crate::extract::{first_own_text, non_empty};
use crate::models::DetailPage;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

/// Label for pages no rule recognizes.
pub const UNKNOWN_SOURCE: &str = "未知來源";

/// Separator between the date and the publisher name in the attribution line.
const ATTRIBUTION_SEPARATOR: char = '｜';

/// Ordered URL fragment table. The first fragment contained in the URL wins.
const URL_SOURCES: [(&str, &str); 8] = [
    ("ettoday", "ETtoday"),
    ("setn", "三立新聞"),
    ("ftnn", "FTNN"),
    ("ltn", "自由時報"),
    ("tvbs", "TVBS"),
    ("udn", "聯合報"),
    ("/stock/", "Yahoo股市"),
    ("/entertainment/", "Yahoo名人娛樂"),
];

static PROVIDER_LOGO: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.caas-attr-provider-logo img").expect("valid provider logo selector")
});
static ATTRIBUTION_META: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.caas-attr-meta").expect("valid attribution selector"));

/// Classify the originating publisher of a page.
pub fn classify(page: &DetailPage) -> String {
    let document = page.document();
    classify_document(&document, &page.url)
}

/// [`classify`] over an already parsed document.
pub fn classify_document(document: &Html, url: &str) -> String {
    from_provider_logo(document)
        .or_else(|| from_attribution(document))
        .or_else(|| from_url(url).map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
}

fn from_provider_logo(document: &Html) -> Option<String> {
    document
        .select(&PROVIDER_LOGO)
        .filter_map(|img| img.value().attr("alt"))
        .next()
        .and_then(non_empty)
}

fn from_attribution(document: &Html) -> Option<String> {
    let text = first_own_text(document, &ATTRIBUTION_META)?;
    match text.rsplit_once(ATTRIBUTION_SEPARATOR) {
        Some((_, publisher)) => non_empty(publisher),
        None => non_empty(&text),
    }
}

/// Look up a URL in the fragment table.
pub fn from_url(url: &str) -> Option<&'static str> {
    let lowered = url.to_lowercase();
    URL_SOURCES
        .iter()
        .find(|(fragment, _)| lowered.contains(fragment))
        .map(|(_, label)| *label)
}
