//! Configuration module for link-sieve
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a missing or empty file yields a usable
//! configuration.
//!
//! # Example
//!
//! ```no_run
//! use link_sieve::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("link-sieve.toml")).unwrap();
//! println!("Request timeout: {}s", config.fetch.timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DefaultScheme, DownloadConfig, FetchConfig, FetchStrategyKind, FilterConfig,
    NamingScheme, OutputConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
