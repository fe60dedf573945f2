//! Syndication stub detection.
//!
//! TVBS articles on Yahoo are stubs: the byline only exists on the TVBS site.
//! For that publisher the pipeline follows one link to `news.tvbs.com.tw`
//! and resolves the author there.

use crate::models::DetailPage;
use once_cell::sync::Lazy;
use scraper::Selector;
use url::Url;

/// Label of the only publisher whose Yahoo pages need a second fetch.
pub const REDIRECT_SOURCE: &str = "TVBS";

/// Host of the originating publisher's site.
pub const ORIGINAL_HOST: &str = "news.tvbs.com.tw";

static ANCHORS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

/// Whether pages with this source label are syndication stubs.
pub fn needs_redirect(label: &str) -> bool {
    label == REDIRECT_SOURCE
}

/// Whether `host` is the original publisher's host or one of its subdomains.
pub fn is_original_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == ORIGINAL_HOST || host.ends_with(&format!(".{ORIGINAL_HOST}"))
}

/// Find the first link on a stub page that points at the original publisher.
///
/// Relative and malformed `href`s are skipped; they cannot point off-site.
pub fn find_original_url(page: &DetailPage) -> Option<String> {
    let document = page.document();
    document
        .select(&ANCHORS)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| {
            Url::parse(href)
                .ok()
                .and_then(|u| u.host_str().map(is_original_host))
                .unwrap_or(false)
        })
        .map(str::to_string)
}
