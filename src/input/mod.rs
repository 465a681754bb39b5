//! Input handling: URL list files and interactive prompts

pub mod prompt;

use crate::{Result, SieveError};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Reads target URLs from a text file
///
/// Each line is trimmed; blank lines and lines starting with `#` are
/// skipped. Order and duplicates are preserved.
///
/// # Arguments
///
/// * `path` - The list file
///
/// # Returns
///
/// * `Ok(Vec<String>)` - At least one target
/// * `Err(SieveError::InputNotFound)` - The file does not exist
/// * `Err(SieveError::EmptyUrlList)` - No usable line was found
/// * `Err(SieveError::Io)` - The file exists but could not be read
pub fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SieveError::InputNotFound {
            path: path.display().to_string(),
        },
        _ => SieveError::Io(e),
    })?;

    let urls = parse_url_list(&content);
    if urls.is_empty() {
        return Err(SieveError::EmptyUrlList {
            path: path.display().to_string(),
        });
    }

    tracing::debug!("Read {} URLs from {}", urls.len(), path.display());
    Ok(urls)
}

/// Extracts targets from list text, skipping blanks and `#` comments
pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}
