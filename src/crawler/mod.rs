//! Crawler module for page fetching and link extraction
//!
//! This module contains the core pipeline, including:
//! - Page fetching over HTTP or, with the `browser` feature, headless Chromium
//! - HTML parsing and link extraction for the three extraction modes
//! - Sequential batch coordination with per-URL error recording

#[cfg(feature = "browser")]
mod browser;
mod coordinator;
mod fetcher;
mod links;
mod parser;
mod report;

#[cfg(feature = "browser")]
pub use browser::BrowserFetcher;
pub use coordinator::{run_batch, BatchObserver, BatchOptions, Coordinator, NoopObserver};
pub use fetcher::{build_http_client, FetchError, FetchStrategy, Fetcher, HttpFetcher, PageFetch};
pub(crate) use fetcher::classify_error;
pub use links::LinkSet;
pub use parser::{
    extract_index_links, extract_links, extract_title, ExtractMode, LinkCandidate, LinkExtractor,
    LinkKind,
};
pub use report::{BatchError, BatchReport, ErrorKind};

use crate::config::Config;
use crate::url::MatchPattern;
use crate::SieveError;

/// Runs a complete batch from configuration
///
/// Builds the configured fetcher, then processes every target in order.
///
/// # Arguments
///
/// * `config` - Loaded configuration (fetch strategy, filters)
/// * `targets` - Raw target strings
/// * `mode` - What to extract from each page
/// * `pattern` - Optional link filter
/// * `observer` - Progress callbacks
///
/// # Returns
///
/// * `Ok(BatchReport)` - The batch ran; per-URL failures are inside the report
/// * `Err(SieveError)` - The fetcher could not be built
pub async fn crawl(
    config: &Config,
    targets: &[String],
    mode: ExtractMode,
    pattern: Option<MatchPattern>,
    observer: &dyn BatchObserver,
) -> Result<BatchReport, SieveError> {
    let fetcher = FetchStrategy::from_config(&config.fetch)?;
    tracing::debug!("Using {} fetcher", fetcher.name());

    let options = BatchOptions::from_config(mode, pattern, config);
    Ok(run_batch(targets, &fetcher, &options, observer).await)
}
