//! link-sieve: fetch web pages and sift their links
//!
//! This crate collects hyperlinks, image links, or directory-listing entries
//! from one or more web pages, filters them by substring or regular
//! expression, and merges them into a single sorted, deduplicated set. It
//! also ships a sequential bulk downloader for the resulting link lists.

pub mod config;
pub mod crawler;
pub mod download;
pub mod input;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for link-sieve operations
#[derive(Debug, Error)]
pub enum SieveError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error(transparent)]
    Fetch(#[from] crawler::FetchError),

    #[error("The page at {url} does not appear to be an 'Index of' page (title mismatch)")]
    NotAnIndexPage { url: String },

    #[error("File not found: '{path}'")]
    InputNotFound { path: String },

    #[error("No URLs found in '{path}'")]
    EmptyUrlList { path: String },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for link-sieve operations
pub type Result<T> = std::result::Result<T, SieveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{extract_links, run_batch, BatchReport, ExtractMode, LinkSet};
pub use url::{add_scheme_if_missing, validate_target, MatchPattern};
