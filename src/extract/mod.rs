//! Page-level extraction stages of the ingestion pipeline.
//!
//! Each submodule is a pure function of a fetched [`DetailPage`](crate::models::DetailPage)
//! (plus, at most, values computed by an earlier stage). None of them touch
//! the network or the filesystem; the orchestrator in [`crate::pipeline`]
//! owns every side effect.
//!
//! # Stages
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Publish time + window check | [`time_window`] | `Option<PublishMoment>` / `bool` |
//! | Publisher detection | [`source`] | `SourceLabel` |
//! | Syndication stub detection | [`redirect`] | `bool` / `Option<String>` |
//! | Byline resolution | [`author`] | `AuthorResolution` |
//!
//! # Common Patterns
//!
//! Selectors and regexes are compiled once into `once_cell::sync::Lazy`
//! statics. Every stage returns `Option` rather than erroring: a missing
//! marker is ordinary for scraped pages.

pub mod author;
pub mod redirect;
pub mod source;
pub mod time_window;

use scraper::{ElementRef, Html, Selector};

/// First direct text node across all elements matching `selector`.
///
/// Mirrors a CSS `::text` pseudo-element query: nested markup inside an
/// element is ignored, and a match with no text of its own is skipped in
/// favour of the next one. Returns the text untrimmed.
pub(crate) fn first_own_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .flat_map(own_text)
        .next()
        .map(str::to_string)
}

/// Direct text children of an element, in document order.
fn own_text<'a>(el: ElementRef<'a>) -> impl Iterator<Item = &'a str> + 'a {
    el.children()
        .filter_map(|node| node.value().as_text().map(|t| &**t))
}

/// Trim and reject empty strings.
pub(crate) fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_own_text_ignores_nested_markup() {
        let doc = Html::parse_document(
            r#"<div class="x"><b>bold</b> own text <i>it</i> tail</div>"#,
        );
        let sel = Selector::parse("div.x").unwrap();
        assert_eq!(first_own_text(&doc, &sel).as_deref(), Some(" own text "));
    }

    #[test]
    fn test_first_own_text_skips_matches_without_text() {
        let doc = Html::parse_document(
            r#"<span class="n"><a>link</a></span><span class="n">陳記者</span>"#,
        );
        let sel = Selector::parse("span.n").unwrap();
        assert_eq!(first_own_text(&doc, &sel).as_deref(), Some("陳記者"));
    }

    #[test]
    fn test_first_own_text_missing_element() {
        let doc = Html::parse_document("<p>nothing</p>");
        let sel = Selector::parse("div.x").unwrap();
        assert_eq!(first_own_text(&doc, &sel), None);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  王小明 \n").as_deref(), Some("王小明"));
        assert_eq!(non_empty(" \t "), None);
    }
}
