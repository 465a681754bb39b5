//! Headless-browser fetcher
//!
//! Loads a page in headless Chromium, lets its scripts run, and returns the
//! rendered DOM. One browser process is launched per fetch and is always
//! shut down before `fetch` returns, whether the page loaded or not.

use crate::config::FetchConfig;
use crate::crawler::fetcher::{until_deadline, FetchError, Fetcher, PageFetch};
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Fetcher that renders pages with headless Chromium
#[derive(Debug, Clone)]
pub struct BrowserFetcher {
    user_agent: String,
    timeout: Duration,
}

impl BrowserFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig, String> {
        BrowserConfig::builder()
            .arg(format!("--user-agent={}", self.user_agent))
            .arg("--disable-gpu")
            .arg("--log-level=3")
            .request_timeout(self.timeout)
            .build()
    }
}

impl Fetcher for BrowserFetcher {
    async fn fetch(&self, url: &Url) -> Result<PageFetch, FetchError> {
        let other = |message: String| FetchError::Other {
            url: url.to_string(),
            message,
        };

        // Launch and render share one deadline
        let deadline = Instant::now() + self.timeout;

        let config = self.browser_config().map_err(other)?;
        let launch = async {
            Browser::launch(config)
                .await
                .map_err(|e| other(format!("failed to launch browser: {}", e)))
        };
        let (mut browser, mut handler) =
            until_deadline(deadline, url, self.timeout, launch).await?;

        // The CDP event loop must be polled for any command to complete
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let outcome = until_deadline(deadline, url, self.timeout, render_page(&browser, url)).await;

        if let Err(e) = browser.close().await {
            tracing::warn!("Failed to close browser after {}: {}", url, e);
        }
        if let Err(e) = browser.wait().await {
            tracing::warn!("Browser process did not exit cleanly: {}", e);
        }
        handler_task.abort();

        outcome
    }
}

/// Navigates a fresh tab and captures the rendered document
async fn render_page(browser: &Browser, url: &Url) -> Result<PageFetch, FetchError> {
    let other = |message: String| FetchError::Other {
        url: url.to_string(),
        message,
    };

    let page = browser
        .new_page(url.as_str())
        .await
        .map_err(|e| other(format!("navigation failed: {}", e)))?;

    page.wait_for_navigation()
        .await
        .map_err(|e| other(format!("page load failed: {}", e)))?;

    let final_url = page
        .url()
        .await
        .map_err(|e| other(e.to_string()))?
        .and_then(|current| Url::parse(&current).ok())
        .unwrap_or_else(|| url.clone());

    let markup = page.content().await.map_err(|e| other(e.to_string()))?;

    if let Err(e) = page.close().await {
        tracing::debug!("Failed to close tab for {}: {}", url, e);
    }

    Ok(PageFetch {
        final_url,
        markup,
        status: 200,
    })
}
