//! URL handling module for link-sieve
//!
//! This module provides target normalization (scheme guessing and
//! validation), link pattern matching, and helpers for turning URLs into
//! file names.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{host_label, safe_file_component};
pub use matcher::MatchPattern;
pub use normalize::{
    add_scheme_if_missing, ensure_directory_slash, is_web_scheme, same_resource_path,
    validate_target,
};
