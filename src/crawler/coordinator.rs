//! Batch coordinator - sequential multi-URL extraction
//!
//! This module drives a list of target URLs through the pipeline:
//! - Adding a default scheme and validating each target
//! - Fetching pages one at a time through a [`Fetcher`]
//! - Extracting links against the post-redirect URL
//! - Recording every per-URL failure in the [`BatchReport`]
//!
//! A failing URL never stops the run.

use crate::config::{Config, DefaultScheme};
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::links::LinkSet;
use crate::crawler::parser::{ExtractMode, LinkExtractor};
use crate::crawler::report::{BatchAccumulator, BatchError, BatchReport, ErrorKind};
use crate::url::{add_scheme_if_missing, ensure_directory_slash, validate_target, MatchPattern};
use crate::SieveError;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use url::Url;

/// How each page of a batch is processed
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub extractor: LinkExtractor,
    /// Scheme prepended to targets that have none
    pub default_scheme: DefaultScheme,
}

impl BatchOptions {
    pub fn new(extractor: LinkExtractor) -> Self {
        Self {
            extractor,
            default_scheme: DefaultScheme::Https,
        }
    }

    /// Builds options from the loaded configuration
    ///
    /// # Arguments
    ///
    /// * `mode` - What to extract from each page
    /// * `pattern` - Optional link filter
    /// * `config` - Supplies the data-URI and default-scheme knobs
    pub fn from_config(mode: ExtractMode, pattern: Option<MatchPattern>, config: &Config) -> Self {
        Self {
            extractor: LinkExtractor::new(mode)
                .with_pattern(pattern)
                .exclude_data_uris(config.filter.exclude_data_uris),
            default_scheme: config.filter.default_scheme,
        }
    }

    pub fn mode(&self) -> ExtractMode {
        self.extractor.mode()
    }
}

/// Progress callbacks for a running batch
///
/// Every method defaults to doing nothing.
pub trait BatchObserver {
    /// Called before a target is looked at; `index` is 1-based
    fn on_url_start(&self, _index: usize, _total: usize, _target: &str) {}

    /// The target was rejected before any request was made
    fn on_skipped(&self, _error: &BatchError) {}

    /// The page was fetched and scanned
    fn on_page_done(&self, _url: &Url, _links: &LinkSet) {}

    /// The fetch or the extraction failed
    fn on_page_failed(&self, _error: &BatchError) {}
}

/// Observer that ignores all events
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// Runs one batch over a borrowed fetcher
pub struct Coordinator<'a, F> {
    fetcher: &'a F,
    options: &'a BatchOptions,
    observer: &'a dyn BatchObserver,
}

impl<'a, F: Fetcher> Coordinator<'a, F> {
    pub fn new(fetcher: &'a F, options: &'a BatchOptions) -> Self {
        Self {
            fetcher,
            options,
            observer: &NoopObserver,
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn BatchObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Processes every target in order and returns the finalized report
    ///
    /// The returned report always satisfies
    /// `processed_count + skipped_count == targets.len()`.
    pub async fn run(&self, targets: &[String]) -> BatchReport {
        let total = targets.len();
        let mut acc = BatchAccumulator::new();

        tracing::info!(
            "Starting batch of {} URLs ({})",
            total,
            self.options.mode().label()
        );

        for (i, target) in targets.iter().enumerate() {
            self.observer.on_url_start(i + 1, total, target);
            self.process_target(&mut acc, target).await;
        }

        let report = acc.finish();
        tracing::info!(
            "Batch finished: {} processed, {} skipped, {} errors, {} unique links",
            report.processed_count,
            report.skipped_count,
            report.errors.len(),
            report.links.len()
        );

        report
    }

    async fn process_target(&self, acc: &mut BatchAccumulator, target: &str) {
        let url = match self.prepare_url(target) {
            Ok(url) => url,
            Err(error) => {
                tracing::warn!("Skipping {}: {}", target, error.message);
                self.observer.on_skipped(&error);
                acc.record_skip(error);
                return;
            }
        };

        let outcome = AssertUnwindSafe(self.fetch_and_extract(&url))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(BatchError {
                    url: url.to_string(),
                    kind: ErrorKind::Other,
                    message: format!("Unexpected failure: {}", panic_message(&*panic)),
                })
            });

        match outcome {
            Ok(links) => {
                self.observer.on_page_done(&url, &links);
                acc.record_page(links);
            }
            Err(error) => {
                tracing::warn!("{}", error.message);
                self.observer.on_page_failed(&error);
                acc.record_failure(error);
            }
        }
    }

    /// Turns a raw target into a fetchable URL
    fn prepare_url(&self, target: &str) -> Result<Url, BatchError> {
        let candidate = add_scheme_if_missing(target, self.options.default_scheme);
        let mut url = validate_target(&candidate).map_err(|e| BatchError {
            url: target.trim().to_string(),
            kind: ErrorKind::InvalidUrlFormat,
            message: format!("Invalid URL format for '{}': {}", target.trim(), e),
        })?;

        if self.options.mode() == ExtractMode::DirectoryListing && ensure_directory_slash(&mut url)
        {
            tracing::debug!("Treating {} as a directory", url);
        }

        Ok(url)
    }

    async fn fetch_and_extract(&self, url: &Url) -> Result<LinkSet, BatchError> {
        let page = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| fetch_failure(url, e))?;

        self.options
            .extractor
            .extract(&page.markup, &page.final_url)
            .map_err(|e| {
                let kind = match e {
                    SieveError::NotAnIndexPage { .. } => ErrorKind::ClassificationMismatch,
                    _ => ErrorKind::Other,
                };
                BatchError {
                    url: page.final_url.to_string(),
                    kind,
                    message: e.to_string(),
                }
            })
    }
}

fn fetch_failure(url: &Url, error: FetchError) -> BatchError {
    BatchError {
        url: url.to_string(),
        kind: ErrorKind::from(&error),
        message: error.to_string(),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs a batch of URLs through fetch and extraction
///
/// # Arguments
///
/// * `targets` - Raw target strings, processed in order
/// * `fetcher` - Page source (HTTP, headless browser, or a test double)
/// * `options` - Extraction mode, pattern and default scheme
/// * `observer` - Progress callbacks
///
/// # Returns
///
/// The finalized [`BatchReport`]. Per-URL failures are recorded in it, so
/// this never fails as a whole.
///
/// # Example
///
/// ```no_run
/// use link_sieve::config::FetchConfig;
/// use link_sieve::crawler::{
///     run_batch, BatchOptions, ExtractMode, HttpFetcher, LinkExtractor, NoopObserver,
/// };
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = HttpFetcher::new(&FetchConfig::default())?;
/// let options = BatchOptions::new(LinkExtractor::new(ExtractMode::Links));
/// let targets = vec!["example.com".to_string()];
/// let report = run_batch(&targets, &fetcher, &options, &NoopObserver).await;
/// println!("{} links", report.links.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_batch<F: Fetcher>(
    targets: &[String],
    fetcher: &F,
    options: &BatchOptions,
    observer: &dyn BatchObserver,
) -> BatchReport {
    Coordinator::new(fetcher, options)
        .with_observer(observer)
        .run(targets)
        .await
}
