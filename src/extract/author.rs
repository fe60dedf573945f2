//! Byline resolution.
//!
//! Yahoo pages expose the author in several inconsistent places depending on
//! the partner feed. Resolution runs an ordered list of strategies and takes
//! the first non-empty result. When every strategy misses, a per-publisher
//! default is used so that a record always carries an author.
//!
//! # Strategies (Yahoo and partner pages)
//!
//! | # | Strategy | Source |
//! |---|----------|--------|
//! | 1 | [`AuthorStrategy::StructuredData`] | JSON-LD `author.name` |
//! | 2 | [`AuthorStrategy::Byline`] | `span.caas-author-name` |
//! | 3 | [`AuthorStrategy::MetaTag`] | `<meta name="author">` |
//! | 4 | [`AuthorStrategy::BodyText`] | Newsroom byline conventions in the body |
//! | 5 | [`AuthorStrategy::Fallback`] | Publisher default table |
//!
//! Pages served from the TVBS site itself use their own two selectors and
//! the TVBS newsroom default ([`AuthorStrategy::PublisherDefault`]).

use crate::extract::redirect::is_original_host;
use crate::extract::{first_own_text, non_empty};
use crate::models::DetailPage;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

/// Default byline for TVBS pages without an author element.
pub const TVBS_NEWSROOM: &str = "TVBS 新聞中心";

/// Suffix appended to unknown publishers' labels for the fallback byline.
pub const NEWSROOM_SUFFIX: &str = "新聞中心";

/// Publisher label → default byline.
const FALLBACK_AUTHORS: [(&str, &str); 8] = [
    ("三立新聞", "三立新聞中心"),
    ("ETtoday", "ETtoday 新聞雲中心"),
    ("TVBS", TVBS_NEWSROOM),
    ("中央社", "中央社"),
    ("聯合報", "聯合報中心"),
    ("FTNN", "FTNN 新聞組"),
    ("Yahoo股市", "Yahoo 股市編輯部"),
    ("Yahoo名人娛樂", "Yahoo 名人娛樂編輯部"),
];

static JSON_LD: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid JSON-LD selector")
});
static CAAS_AUTHOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.caas-author-name").expect("valid byline selector"));
static META_AUTHOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="author"]"#).expect("valid meta selector"));
static CAAS_BODY: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".caas-body").expect("valid body selector"));
static TVBS_AUTHOR_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.author a").expect("valid TVBS author selector"));
static TVBS_AUTHOR_NAME: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.author-name").expect("valid TVBS name selector"));

/// Newsroom byline conventions, tried in order. Group 1 is the author.
///
/// 1. `記者王小明／台北報導` (reporter, then a slash)
/// 2. `王小明／綜合報導` (compiled report)
/// 3. `編譯王小明` (translator)
static BODY_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"(記者[\x{4e00}-\x{9fa5}]{2,3})[／/]").expect("valid reporter pattern"),
        Regex::new(r"([\x{4e00}-\x{9fa5}]{2,3})／綜合報導").expect("valid compiled pattern"),
        Regex::new(r"(編譯[\x{4e00}-\x{9fa5}]{2,3})").expect("valid translator pattern"),
    ]
});

/// Which strategy produced an author name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorStrategy {
    StructuredData,
    Byline,
    MetaTag,
    BodyText,
    /// One of the publisher-site selectors on the original TVBS page.
    PublisherPage,
    /// Original TVBS page without an author element; the TVBS newsroom default.
    PublisherDefault,
    /// No marker was found; the name is a publisher default.
    Fallback,
}

/// A resolved byline and how it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorResolution {
    /// The author name. Never empty.
    pub name: String,
    pub strategy: AuthorStrategy,
}

impl AuthorResolution {
    /// True when the generic strategy chain found no marker on the page.
    ///
    /// The pipeline dumps such pages for offline inspection. The TVBS-site
    /// default is not a fallback in this sense.
    pub fn is_fallback(&self) -> bool {
        self.strategy == AuthorStrategy::Fallback
    }
}

type Strategy = fn(&Html) -> Option<String>;

/// Extraction strategies for Yahoo and partner pages, in priority order.
const STRATEGIES: [(AuthorStrategy, Strategy); 4] = [
    (AuthorStrategy::StructuredData, from_structured_data),
    (AuthorStrategy::Byline, from_byline),
    (AuthorStrategy::MetaTag, from_meta_tag),
    (AuthorStrategy::BodyText, from_body_text),
];

/// Resolve the author of a page.
///
/// # Arguments
///
/// * `page` - The fetched page to inspect
/// * `source` - The publisher label from [`crate::extract::source::classify`]
///
/// # Returns
///
/// An [`AuthorResolution`] whose `name` is never empty. Pages served from the
/// TVBS site are read with TVBS selectors; all other pages go through the
/// strategy chain and then the fallback table.
pub fn resolve(page: &DetailPage, source: &str) -> AuthorResolution {
    let document = page.document();

    if page.host().as_deref().is_some_and(is_original_host) {
        return resolve_publisher_page(&document);
    }

    for (strategy, extract) in STRATEGIES {
        if let Some(name) = extract(&document) {
            debug!(url = %page.url, ?strategy, %name, "Resolved author");
            return AuthorResolution { name, strategy };
        }
    }

    AuthorResolution {
        name: fallback_author(source),
        strategy: AuthorStrategy::Fallback,
    }
}

fn resolve_publisher_page(document: &Html) -> AuthorResolution {
    let found = first_own_text(document, &TVBS_AUTHOR_LINK)
        .as_deref()
        .and_then(non_empty)
        .or_else(|| {
            first_own_text(document, &TVBS_AUTHOR_NAME)
                .as_deref()
                .and_then(non_empty)
        });

    match found {
        Some(name) => AuthorResolution {
            name,
            strategy: AuthorStrategy::PublisherPage,
        },
        None => AuthorResolution {
            name: TVBS_NEWSROOM.to_string(),
            strategy: AuthorStrategy::PublisherDefault,
        },
    }
}

/// Default byline for a publisher label.
pub fn fallback_author(source: &str) -> String {
    FALLBACK_AUTHORS
        .iter()
        .find(|(label, _)| *label == source)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("{source} {NEWSROOM_SUFFIX}"))
}

fn from_structured_data(document: &Html) -> Option<String> {
    document
        .select(&JSON_LD)
        .filter_map(|script| {
            let raw = script.text().collect::<String>();
            serde_json::from_str::<Value>(&raw).ok()
        })
        .find_map(|data| ld_author_name(&data))
}

/// `author.name` of a JSON-LD object, for either a list of authors or a single one.
fn ld_author_name(data: &Value) -> Option<String> {
    let author = data.as_object()?.get("author")?;
    let first = match author {
        Value::Array(list) => list.first()?,
        other => other,
    };
    first.get("name")?.as_str().and_then(non_empty)
}

fn from_byline(document: &Html) -> Option<String> {
    first_own_text(document, &CAAS_AUTHOR)
        .as_deref()
        .and_then(non_empty)
}

fn from_meta_tag(document: &Html) -> Option<String> {
    document
        .select(&META_AUTHOR)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .and_then(non_empty)
}

fn from_body_text(document: &Html) -> Option<String> {
    let body = document.select(&CAAS_BODY).next()?;
    let text: String = body
        .text()
        .flat_map(str::chars)
        .filter(|c| !c.is_whitespace())
        .collect();
    match_byline(&text)
}

/// Match the newsroom byline patterns against whitespace-free body text.
pub fn match_byline(text: &str) -> Option<String> {
    BODY_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yahoo(body: &str) -> DetailPage {
        DetailPage::new(
            "https://tw.news.yahoo.com/story-123.html",
            format!("<html><head></head><body>{body}</body></html>"),
        )
    }

    #[test]
    fn test_structured_data_single_author() {
        let page = yahoo(
            r#"<script type="application/ld+json">{"author":{"name":"王小明"}}</script>"#,
        );
        let r = resolve(&page, "ETtoday");
        assert_eq!(r.name, "王小明");
        assert_eq!(r.strategy, AuthorStrategy::StructuredData);
    }

    #[test]
    fn test_structured_data_author_list_takes_first() {
        let page = yahoo(
            r#"<script type="application/ld+json">{"@type":"NewsArticle","author":[{"name":" 林美華 "},{"name":"張三"}]}</script>"#,
        );
        assert_eq!(resolve(&page, "ETtoday").name, "林美華");
    }

    #[test]
    fn test_malformed_json_ld_is_skipped() {
        let page = yahoo(
            r#"<script type="application/ld+json">{"author": {"name": </script>
               <script type="application/ld+json">[{"author":{"name":"array root"}}]</script>
               <script type="application/ld+json">{"author":[]}</script>
               <script type="application/ld+json">{"author":{"name":"李四"}}</script>"#,
        );
        assert_eq!(resolve(&page, "ETtoday").name, "李四");
    }

    #[test]
    fn test_structured_data_beats_meta_tag() {
        let page = DetailPage::new(
            "https://tw.news.yahoo.com/story-123.html",
            r#"<html><head><meta name="author" content="錯誤作者"></head><body>
               <script type="application/ld+json">{"author":{"name":"正確作者"}}</script>
               </body></html>"#,
        );
        let r = resolve(&page, "ETtoday");
        assert_eq!(r.name, "正確作者");
        assert_eq!(r.strategy, AuthorStrategy::StructuredData);
    }

    #[test]
    fn test_byline_then_meta() {
        let page = DetailPage::new(
            "https://tw.news.yahoo.com/story-123.html",
            r#"<html><head><meta name="author" content="meta 作者"></head><body>
               <span class="caas-author-name"> 陳記者 </span></body></html>"#,
        );
        let r = resolve(&page, "ETtoday");
        assert_eq!(r.name, "陳記者");
        assert_eq!(r.strategy, AuthorStrategy::Byline);

        let page = DetailPage::new(
            "https://tw.news.yahoo.com/story-123.html",
            r#"<html><head><meta name="author" content=" meta 作者 "></head><body></body></html>"#,
        );
        let r = resolve(&page, "ETtoday");
        assert_eq!(r.name, "meta 作者");
        assert_eq!(r.strategy, AuthorStrategy::MetaTag);
    }

    #[test]
    fn test_byline_skips_span_without_own_text() {
        let page = DetailPage::new(
            "https://tw.news.yahoo.com/story-123.html",
            r#"<html><head><meta name="author" content="meta作者"></head><body>
               <span class="caas-author-name"><a href="/x">x</a></span>
               <span class="caas-author-name">陳記者</span></body></html>"#,
        );
        let r = resolve(&page, "ETtoday");
        assert_eq!(r.name, "陳記者");
        assert_eq!(r.strategy, AuthorStrategy::Byline);
    }

    #[test]
    fn test_body_text_reporter_pattern() {
        let page = yahoo(
            r#"<div class="caas-body"><p>〔記者陳大文／台北報導〕</p><p>今天 天氣 晴。</p></div>"#,
        );
        let r = resolve(&page, "自由時報");
        assert_eq!(r.name, "記者陳大文");
        assert_eq!(r.strategy, AuthorStrategy::BodyText);
    }

    #[test]
    fn test_body_text_ignores_whitespace_between_characters() {
        let page = yahoo(
            "<div class=\"caas-body\"><p>記者 陳大文\n/ 台北報導</p></div>",
        );
        assert_eq!(resolve(&page, "自由時報").name, "記者陳大文");
    }

    #[test]
    fn test_match_byline_pattern_order() {
        assert_eq!(match_byline("中央社／綜合報導").as_deref(), Some("中央社"));
        assert_eq!(match_byline("〔外電／綜合報導〕").as_deref(), Some("外電"));
        assert_eq!(match_byline("編譯林小華／綜合外電").as_deref(), Some("編譯林小華"));
        assert_eq!(
            match_byline("記者王大同／綜合報導").as_deref(),
            Some("記者王大同")
        );
        assert_eq!(match_byline("no byline here"), None);
    }

    #[test]
    fn test_fallback_known_source() {
        let r = resolve(&yahoo("<p>沒有作者</p>"), "ETtoday");
        assert_eq!(r.name, "ETtoday 新聞雲中心");
        assert!(r.is_fallback());
    }

    #[test]
    fn test_fallback_is_distinct_per_label() {
        assert_ne!(fallback_author("ETtoday"), fallback_author("三立新聞"));
        assert_eq!(fallback_author("Yahoo股市"), "Yahoo 股市編輯部");
    }

    #[test]
    fn test_fallback_unknown_source_gets_suffix() {
        assert_eq!(fallback_author("鏡週刊"), "鏡週刊 新聞中心");
        assert_eq!(fallback_author("未知來源"), "未知來源 新聞中心");
    }

    #[test]
    fn test_tvbs_publisher_page_selectors() {
        let page = DetailPage::new(
            "https://news.tvbs.com.tw/politics/111",
            r#"<div class="author"><a href="/author/1"> 王記者 </a></div>
               <span class="author-name">備用</span>"#,
        );
        let r = resolve(&page, "TVBS");
        assert_eq!(r.name, "王記者");
        assert_eq!(r.strategy, AuthorStrategy::PublisherPage);

        let page = DetailPage::new(
            "https://news.tvbs.com.tw/politics/111",
            r#"<span class="author-name"> 林記者 </span>"#,
        );
        assert_eq!(resolve(&page, "TVBS").name, "林記者");

        let page = DetailPage::new(
            "https://news.tvbs.com.tw/politics/111",
            r#"<div class="author"><a href="/author/1"><img src="a.png"></a></div>
               <div class="author"><a href="/author/2">張記者</a></div>"#,
        );
        assert_eq!(resolve(&page, "TVBS").name, "張記者");
    }

    #[test]
    fn test_tvbs_publisher_page_default() {
        let page = DetailPage::new(
            "https://news.tvbs.com.tw/politics/111",
            r#"<html><head><meta name="author" content="ignored"></head></html>"#,
        );
        let r = resolve(&page, "TVBS");
        assert_eq!(r.name, TVBS_NEWSROOM);
        assert_eq!(r.strategy, AuthorStrategy::PublisherDefault);
        assert!(!r.is_fallback());
    }

    #[test]
    fn test_tvbs_stub_uses_generic_chain() {
        let page = DetailPage::new(
            "https://tw.news.yahoo.com/tvbs-1.html",
            r#"<html><head><meta name="author" content="TVBS 記者"></head></html>"#,
        );
        assert_eq!(resolve(&page, "TVBS").name, "TVBS 記者");
    }
}
