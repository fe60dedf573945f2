//! Memoizing link shortener with provider failover.
//!
//! Long article URLs are shortened through public "create" endpoints that
//! answer a GET with the short URL as plain text. Providers are tried in
//! order; if none answers usefully the long URL is kept.
//!
//! # Caching
//!
//! Every outcome, including the fallback to the long URL, is cached for the
//! lifetime of the [`LinkShortener`]. Concurrent callers asking for the same
//! URL share one in-flight attempt, so a URL costs at most one provider chain
//! per run.

use crate::error::CrawlError;
use crate::utils::truncate_for_log;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};

/// Placeholder replaced by the percent-encoded long URL in an endpoint.
pub const URL_PLACEHOLDER: &str = "{url}";

/// Default per-provider timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);

/// A shortening service reachable by a single GET.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShortenProvider {
    /// Name used in logs.
    pub name: String,
    /// Endpoint template containing [`URL_PLACEHOLDER`].
    pub endpoint: String,
}

impl ShortenProvider {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
        }
    }

    /// TinyURL's plain-text API.
    pub fn tinyurl() -> Self {
        Self::new("tinyurl", "https://tinyurl.com/api-create.php?url={url}")
    }

    /// is.gd's plain-text API.
    pub fn isgd() -> Self {
        Self::new("is.gd", "https://is.gd/create.php?format=simple&url={url}")
    }

    /// TinyURL first, then is.gd.
    pub fn defaults() -> Vec<Self> {
        vec![Self::tinyurl(), Self::isgd()]
    }

    fn request_url(&self, long_url: &str) -> String {
        self.endpoint
            .replace(URL_PLACEHOLDER, &urlencoding::encode(long_url))
    }
}

/// Shortens URLs through an ordered provider list, memoizing every result.
#[derive(Debug)]
pub struct LinkShortener {
    client: reqwest::Client,
    providers: Vec<ShortenProvider>,
    timeout: Duration,
    cache: Mutex<HashMap<String, Arc<OnceCell<String>>>>,
}

impl LinkShortener {
    /// Create a shortener.
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `providers` - Services to try, in order
    /// * `timeout` - Upper bound for each provider attempt
    pub fn new(client: reqwest::Client, providers: Vec<ShortenProvider>, timeout: Duration) -> Self {
        Self {
            client,
            providers,
            timeout,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Shorten `long_url`.
    ///
    /// Never fails and never returns an empty string: when every provider
    /// errors, times out, or answers with something that is not a URL, the
    /// long URL comes back unchanged.
    #[instrument(level = "debug", skip(self))]
    pub async fn shorten(&self, long_url: &str) -> String {
        let cell = {
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(cache.entry(long_url.to_string()).or_default())
        };

        cell.get_or_init(|| self.shorten_uncached(long_url))
            .await
            .clone()
    }

    /// Number of URLs with a cached outcome or an attempt in flight.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    async fn shorten_uncached(&self, long_url: &str) -> String {
        for provider in &self.providers {
            let t0 = Instant::now();
            match self.try_provider(provider, long_url).await {
                Ok(short) => {
                    debug!(
                        provider = %provider.name,
                        elapsed_ms = t0.elapsed().as_millis() as u64,
                        %short,
                        "Shortened URL"
                    );
                    return short;
                }
                Err(reason) => {
                    warn!(
                        provider = %provider.name,
                        elapsed_ms = t0.elapsed().as_millis() as u64,
                        %reason,
                        "Shortening provider failed; trying next"
                    );
                }
            }
        }

        warn!(%long_url, "All shortening providers failed; keeping original URL");
        long_url.to_string()
    }

    async fn try_provider(
        &self,
        provider: &ShortenProvider,
        long_url: &str,
    ) -> Result<String, CrawlError> {
        let url = provider.request_url(long_url);
        let response = self.client.get(&url).timeout(self.timeout).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let short = body.trim();
        if short.starts_with("http") {
            Ok(short.to_string())
        } else {
            Err(CrawlError::UnexpectedBody(truncate_for_log(short, 80)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LONG: &str = "https://tw.news.yahoo.com/台積電-法說會-123.html?a=1&b=2";

    fn provider(server: &MockServer, route: &str) -> ShortenProvider {
        ShortenProvider::new(route, format!("{}/{route}?url={{url}}", server.uri()))
    }

    fn shortener(providers: Vec<ShortenProvider>) -> LinkShortener {
        LinkShortener::new(reqwest::Client::new(), providers, Duration::from_millis(500))
    }

    #[tokio::test]
    async fn test_first_provider_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .and(query_param("url", LONG))
            .respond_with(ResponseTemplate::new(200).set_body_string("https://tinyurl.com/abc\n"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(200).set_body_string("https://is.gd/zzz"))
            .expect(0)
            .mount(&server)
            .await;

        let s = shortener(vec![provider(&server, "a"), provider(&server, "b")]);
        assert_eq!(s.shorten(LONG).await, "https://tinyurl.com/abc");
    }

    #[tokio::test]
    async fn test_failover_on_error_status_and_bad_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Error: rate limited"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/c"))
            .respond_with(ResponseTemplate::new(200).set_body_string("https://is.gd/zzz"))
            .mount(&server)
            .await;

        let s = shortener(vec![
            provider(&server, "a"),
            provider(&server, "b"),
            provider(&server, "c"),
        ]);
        assert_eq!(s.shorten(LONG).await, "https://is.gd/zzz");
    }

    #[tokio::test]
    async fn test_timeout_falls_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("https://tinyurl.com/late")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("https://is.gd/fast"))
            .mount(&server)
            .await;

        let s = shortener(vec![provider(&server, "slow"), provider(&server, "fast")]);
        assert_eq!(s.shorten(LONG).await, "https://is.gd/fast");
    }

    #[tokio::test]
    async fn test_all_providers_down_returns_original_and_caches_it() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let s = shortener(vec![provider(&server, "a"), provider(&server, "b")]);
        let first = s.shorten(LONG).await;
        let second = s.shorten(LONG).await;
        assert_eq!(first, LONG);
        assert_eq!(second, LONG);
        assert!(!first.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_providers_return_original() {
        let s = shortener(vec![ShortenProvider::new(
            "closed",
            "http://127.0.0.1:9/create?url={url}",
        )]);
        assert_eq!(s.shorten(LONG).await, LONG);
    }

    #[tokio::test]
    async fn test_memoized_single_network_chain() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(200).set_body_string("https://tinyurl.com/once"))
            .expect(1)
            .mount(&server)
            .await;

        let s = shortener(vec![provider(&server, "a")]);
        let (x, y) = tokio::join!(s.shorten(LONG), s.shorten(LONG));
        let z = s.shorten(LONG).await;
        assert_eq!(x, "https://tinyurl.com/once");
        assert_eq!(x, y);
        assert_eq!(y, z);
        assert_eq!(s.cached_len(), 1);
    }

    #[test]
    fn test_request_url_encodes_long_url() {
        let p = ShortenProvider::isgd();
        assert_eq!(
            p.request_url("https://a.b/c?d=e&f=g"),
            "https://is.gd/create.php?format=simple&url=https%3A%2F%2Fa.b%2Fc%3Fd%3De%26f%3Dg"
        );
    }
}
