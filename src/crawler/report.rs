//! Batch outcome types

use crate::crawler::fetcher::FetchError;
use crate::crawler::links::LinkSet;
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::fmt;

/// Category of a per-URL failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    /// Target could not be turned into an http(s) URL with a host
    InvalidUrlFormat,
    FetchTimeout,
    ConnectionError,
    HttpStatusError,
    /// Directory-listing mode: the page is not an index page
    ClassificationMismatch,
    Other,
}

impl ErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidUrlFormat => "invalid URL",
            Self::FetchTimeout => "timeout",
            Self::ConnectionError => "connection error",
            Self::HttpStatusError => "HTTP error",
            Self::ClassificationMismatch => "not an index page",
            Self::Other => "other error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&FetchError> for ErrorKind {
    fn from(error: &FetchError) -> Self {
        match error {
            FetchError::Timeout { .. } => Self::FetchTimeout,
            FetchError::Connection { .. } => Self::ConnectionError,
            FetchError::HttpStatus { .. } => Self::HttpStatusError,
            FetchError::Other { .. } => Self::Other,
        }
    }
}

/// One recorded per-URL failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchError {
    /// The URL as it was attempted (or as given, for skipped entries)
    pub url: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// Finalized outcome of a batch run
///
/// `processed_count + skipped_count` always equals the number of input URLs.
/// Failed fetches count as processed: they were attempted.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub processed_count: usize,
    pub skipped_count: usize,
    /// Failures in input order
    pub errors: Vec<BatchError>,
    /// Merged links of every successful page
    pub links: LinkSet,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl BatchReport {
    pub fn total_urls(&self) -> usize {
        self.processed_count + self.skipped_count
    }

    /// Pages that were fetched and yielded a link set (possibly empty)
    pub fn succeeded_count(&self) -> usize {
        let failed_fetches = self
            .errors
            .iter()
            .filter(|e| e.kind != ErrorKind::InvalidUrlFormat)
            .count();
        self.processed_count.saturating_sub(failed_fetches)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Error counts by kind
    pub fn error_summary(&self) -> BTreeMap<ErrorKind, usize> {
        let mut summary = BTreeMap::new();
        for error in &self.errors {
            *summary.entry(error.kind).or_insert(0) += 1;
        }
        summary
    }
}

/// Mutable state of a batch in progress
///
/// Owned exclusively by the coordinator; [`BatchAccumulator::finish`]
/// consumes it, so a finalized report can no longer change.
#[derive(Debug)]
pub(crate) struct BatchAccumulator {
    processed_count: usize,
    skipped_count: usize,
    errors: Vec<BatchError>,
    links: LinkSet,
    started_at: DateTime<Local>,
}

impl BatchAccumulator {
    pub(crate) fn new() -> Self {
        Self {
            processed_count: 0,
            skipped_count: 0,
            errors: Vec::new(),
            links: LinkSet::new(),
            started_at: Local::now(),
        }
    }

    pub(crate) fn record_page(&mut self, links: LinkSet) {
        self.processed_count += 1;
        self.links.merge(links);
    }

    pub(crate) fn record_failure(&mut self, error: BatchError) {
        self.processed_count += 1;
        self.errors.push(error);
    }

    pub(crate) fn record_skip(&mut self, error: BatchError) {
        self.skipped_count += 1;
        self.errors.push(error);
    }

    pub(crate) fn finish(self) -> BatchReport {
        BatchReport {
            processed_count: self.processed_count,
            skipped_count: self.skipped_count,
            errors: self.errors,
            links: self.links,
            started_at: self.started_at,
            finished_at: Local::now(),
        }
    }
}
