//! Output handler traits and types
//!
//! This module defines the trait interface for report writers and the
//! metadata that accompanies a saved link list.

use crate::crawler::{BatchReport, ExtractMode};
use crate::url::{host_label, MatchPattern};
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Error writing to file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Where the processed URLs came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSource {
    /// A single page given directly
    Page(Url),
    /// A text file with one URL per line
    UrlList(PathBuf),
}

impl ReportSource {
    /// Short label used in default file names
    pub fn name_stem(&self) -> String {
        match self {
            Self::Page(url) => host_label(url),
            Self::UrlList(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "urls".to_string()),
        }
    }
}

impl std::fmt::Display for ReportSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Page(url) => write!(f, "{}", url),
            Self::UrlList(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Context recorded in the header of a saved link list
#[derive(Debug, Clone)]
pub struct SaveMetadata {
    pub source: ReportSource,
    pub mode: ExtractMode,
    pub pattern: Option<MatchPattern>,
    /// SHA-256 of the configuration file in effect, if one was loaded
    pub config_hash: Option<String>,
}

impl SaveMetadata {
    pub fn new(source: ReportSource, mode: ExtractMode, pattern: Option<MatchPattern>) -> Self {
        Self {
            source,
            mode,
            pattern,
            config_hash: None,
        }
    }

    pub fn with_config_hash(mut self, hash: Option<String>) -> Self {
        self.config_hash = hash;
        self
    }
}

/// Trait for report writers
///
/// A writer persists a finalized [`BatchReport`]. Failing to persist never
/// invalidates the report itself; callers report the error and move on.
pub trait ReportWriter {
    /// Persists the report
    ///
    /// # Arguments
    ///
    /// * `report` - The finalized batch outcome
    /// * `metadata` - Source, mode and pattern for the header
    fn write_report(&self, report: &BatchReport, metadata: &SaveMetadata) -> OutputResult<()>;
}
