//! Page fetching
//!
//! This module defines the [`Fetcher`] capability the batch coordinator
//! depends on, and its HTTP implementation:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests that follow redirects and report the final URL
//! - Error classification (timeout, connection, HTTP status, other)
//!
//! The headless-browser implementation lives in `browser.rs` behind the
//! `browser` feature; [`FetchStrategy`] selects between the two from
//! configuration.

use crate::config::{FetchConfig, FetchStrategyKind};
use crate::SieveError;
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[cfg(feature = "browser")]
use crate::crawler::browser::BrowserFetcher;

/// A successfully retrieved page
#[derive(Debug, Clone)]
pub struct PageFetch {
    /// URL after following redirects; the base for relative links
    pub final_url: Url,
    /// Raw (or rendered) HTML
    pub markup: String,
    /// HTTP status code
    pub status: u16,
}

impl PageFetch {
    pub fn status_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Why a single page could not be fetched
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("The request to {url} timed out after {timeout_secs} seconds")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("Could not connect to {url}. Check network or URL validity ({message})")]
    Connection { url: String, message: String },

    #[error("HTTP Error {status} for URL {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Error fetching URL {url}: {message}")]
    Other { url: String, message: String },
}

impl FetchError {
    /// The URL the failed request was sent to
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url, .. }
            | Self::Connection { url, .. }
            | Self::HttpStatus { url, .. }
            | Self::Other { url, .. } => url,
        }
    }
}

/// Retrieves page markup for the batch coordinator
///
/// Implementations follow redirects and must report the post-redirect URL in
/// [`PageFetch::final_url`]. Every failure is returned as a [`FetchError`]
/// value; nothing is retried.
pub trait Fetcher {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<PageFetch, FetchError>>;
}

/// Builds an HTTP client from the fetch configuration
///
/// # Example
///
/// ```no_run
/// use link_sieve::config::FetchConfig;
/// use link_sieve::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Plain HTTP GET fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            timeout: config.timeout(),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<PageFetch, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, self.timeout, e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if final_url != *url {
            tracing::debug!("{} redirected to {}", url, final_url);
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.is_empty() && !content_type.contains("html") {
            tracing::debug!("{} served {} rather than HTML", final_url, content_type);
        }

        let markup = response
            .text()
            .await
            .map_err(|e| classify_error(url, self.timeout, e))?;

        Ok(PageFetch {
            final_url,
            markup,
            status: status.as_u16(),
        })
    }
}

/// Maps a reqwest error onto the fetch error taxonomy
pub(crate) fn classify_error(url: &Url, timeout: Duration, e: reqwest::Error) -> FetchError {
    let url = url.to_string();

    if e.is_timeout() {
        FetchError::Timeout {
            url,
            timeout_secs: timeout.as_secs(),
        }
    } else if e.is_connect() {
        FetchError::Connection {
            url,
            message: root_cause(&e),
        }
    } else if let Some(status) = e.status() {
        FetchError::HttpStatus {
            url,
            status: status.as_u16(),
        }
    } else if e.is_redirect() {
        FetchError::Other {
            url,
            message: "too many redirects".to_string(),
        }
    } else {
        FetchError::Other {
            url,
            message: root_cause(&e),
        }
    }
}

/// Innermost error message, which is what a user can act on
fn root_cause(e: &(dyn std::error::Error + 'static)) -> String {
    let mut current = e;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

/// Runs `work` until `deadline`, reporting expiry as a timeout for `url`
///
/// Several steps of one fetch can share a single deadline this way, so the
/// whole fetch stays within the configured timeout.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
pub(crate) async fn until_deadline<T, F>(
    deadline: tokio::time::Instant,
    url: &Url,
    timeout: Duration,
    work: F,
) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    match tokio::time::timeout_at(deadline, work).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout {
            url: url.to_string(),
            timeout_secs: timeout.as_secs(),
        }),
    }
}

/// The fetch implementation chosen by configuration
#[derive(Debug)]
pub enum FetchStrategy {
    Http(HttpFetcher),
    #[cfg(feature = "browser")]
    Browser(BrowserFetcher),
}

impl FetchStrategy {
    /// Builds the configured fetcher
    ///
    /// # Returns
    ///
    /// * `Ok(FetchStrategy)` - Ready to fetch
    /// * `Err(SieveError)` - Client construction failed, or the browser
    ///   strategy was requested from a build without the `browser` feature
    pub fn from_config(config: &FetchConfig) -> Result<Self, SieveError> {
        match config.strategy {
            FetchStrategyKind::Http => Ok(Self::Http(HttpFetcher::new(config)?)),
            #[cfg(feature = "browser")]
            FetchStrategyKind::Browser => Ok(Self::Browser(BrowserFetcher::new(config))),
            #[cfg(not(feature = "browser"))]
            FetchStrategyKind::Browser => Err(crate::ConfigError::Validation(
                "the browser fetch strategy is not available in this build".to_string(),
            )
            .into()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            #[cfg(feature = "browser")]
            Self::Browser(_) => "browser",
        }
    }
}

impl Fetcher for FetchStrategy {
    async fn fetch(&self, url: &Url) -> Result<PageFetch, FetchError> {
        match self {
            Self::Http(fetcher) => fetcher.fetch(url).await,
            #[cfg(feature = "browser")]
            Self::Browser(fetcher) => fetcher.fetch(url).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> FetchConfig {
        FetchConfig {
            timeout_secs: 5,
            user_agent: "TestAgent/1.0".to_string(),
            ..FetchConfig::default()
        }
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&create_test_config()).is_ok());
    }

    #[test]
    fn test_strategy_from_default_config() {
        let strategy = FetchStrategy::from_config(&create_test_config()).unwrap();
        assert_eq!(strategy.name(), "http");
    }

    #[cfg(not(feature = "browser"))]
    #[test]
    fn test_browser_strategy_unavailable() {
        let config = FetchConfig {
            strategy: FetchStrategyKind::Browser,
            ..create_test_config()
        };
        assert!(matches!(
            FetchStrategy::from_config(&config),
            Err(SieveError::Config(_))
        ));
    }

    #[test]
    fn test_page_fetch_status_ok() {
        let page = PageFetch {
            final_url: Url::parse("http://a.test/").unwrap(),
            markup: String::new(),
            status: 204,
        };
        assert!(page.status_ok());
        assert!(!PageFetch { status: 404, ..page }.status_ok());
    }

    #[test]
    fn test_fetch_error_messages() {
        let err = FetchError::Timeout {
            url: "http://a.test/".to_string(),
            timeout_secs: 20,
        };
        assert_eq!(
            err.to_string(),
            "The request to http://a.test/ timed out after 20 seconds"
        );
        assert_eq!(err.url(), "http://a.test/");

        let err = FetchError::HttpStatus {
            url: "http://a.test/missing".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "HTTP Error 404 for URL http://a.test/missing");
    }

    #[tokio::test]
    async fn test_until_deadline_covers_every_step() {
        let url = Url::parse("http://a.test/").unwrap();
        let timeout = Duration::from_millis(100);
        let deadline = tokio::time::Instant::now() + timeout;

        // The first step uses most of the budget
        let first = until_deadline(deadline, &url, timeout, async {
            tokio::time::sleep(Duration::from_millis(60)).await;
            Ok::<_, FetchError>(1)
        })
        .await;
        assert_eq!(first.unwrap(), 1);

        // The second step only gets what is left
        let started = std::time::Instant::now();
        let second = until_deadline(deadline, &url, timeout, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, FetchError>(2)
        })
        .await;
        assert!(matches!(second, Err(FetchError::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_until_deadline_passes_errors_through() {
        let url = Url::parse("http://a.test/").unwrap();
        let timeout = Duration::from_secs(5);
        let result: Result<(), FetchError> = until_deadline(
            tokio::time::Instant::now() + timeout,
            &url,
            timeout,
            async {
                Err(FetchError::Other {
                    url: "http://a.test/".to_string(),
                    message: "failed to launch browser".to_string(),
                })
            },
        )
        .await;
        assert!(matches!(result, Err(FetchError::Other { .. })));
    }
}
