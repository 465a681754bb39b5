//! Plain-text link list files
//!
//! A saved list is a `#`-prefixed header describing the run followed by one
//! link per line in sorted order.

use crate::crawler::{BatchReport, ExtractMode};
use crate::output::traits::{OutputError, OutputResult, ReportSource, ReportWriter, SaveMetadata};
use crate::url::safe_file_component;
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Body line written when nothing matched
pub const EMPTY_PLACEHOLDER: &str = "(No links matched the given pattern)";

/// Writes a report as a text link list
///
/// Missing parent directories are created.
///
/// # Arguments
///
/// * `path` - Destination file, overwritten if it exists
/// * `report` - The finalized batch outcome
/// * `metadata` - Header context
///
/// # Returns
///
/// * `Ok(())` - File written
/// * `Err(OutputError::Write)` - The file or its directory could not be written
pub fn save_report(path: &Path, report: &BatchReport, metadata: &SaveMetadata) -> OutputResult<()> {
    let write_error = |source: std::io::Error| OutputError::Write {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }

    let file = File::create(path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(format_report(report, metadata).as_bytes())
        .map_err(write_error)?;
    writer.flush().map_err(write_error)?;

    tracing::info!("Saved {} links to {}", report.links.len(), path.display());
    Ok(())
}

/// Renders the file contents for a report
pub fn format_report(report: &BatchReport, metadata: &SaveMetadata) -> String {
    let mut text = String::new();

    text.push_str(&format!(
        "# Links fetched by {} from: {}\n",
        env!("CARGO_PKG_NAME"),
        metadata.source
    ));
    text.push_str(&format!("# Mode: {}\n", metadata.mode.label()));

    match &metadata.pattern {
        Some(pattern) if pattern.is_regex() => {
            text.push_str(&format!("# Pattern: {} (regex)\n", pattern.as_str()))
        }
        Some(pattern) => text.push_str(&format!("# Pattern: {}\n", pattern.as_str())),
        None => text.push_str("# Pattern: (none)\n"),
    }

    text.push_str(&format!(
        "# Retrieved at: {}\n",
        report.finished_at.format("%Y-%m-%d %H:%M:%S")
    ));
    text.push_str(&format!(
        "# URLs processed: {}, skipped: {}, errors: {}\n",
        report.processed_count,
        report.skipped_count,
        report.errors.len()
    ));
    text.push_str(&format!("# Total unique links: {}\n", report.links.len()));

    if let Some(hash) = &metadata.config_hash {
        text.push_str(&format!("# Config hash: {}\n", hash));
    }

    text.push('#');
    text.push_str(&"-".repeat(40));
    text.push('\n');

    if report.links.is_empty() {
        text.push_str(EMPTY_PLACEHOLDER);
        text.push('\n');
    } else {
        for link in report.links.iter() {
            text.push_str(link);
            text.push('\n');
        }
    }

    text
}

/// Proposes a file name for a saved list
///
/// # Example
///
/// ```
/// use chrono::{Local, TimeZone};
/// use link_sieve::crawler::ExtractMode;
/// use link_sieve::output::{default_output_name, ReportSource, SaveMetadata};
/// use url::Url;
///
/// let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
/// let source = ReportSource::Page(Url::parse("https://example.com/x").unwrap());
/// let metadata = SaveMetadata::new(source, ExtractMode::Links, None);
/// assert_eq!(default_output_name(&metadata, now), "example.com_20240309_140500.txt");
/// ```
pub fn default_output_name(metadata: &SaveMetadata, now: DateTime<Local>) -> String {
    let timestamp = now.format("%Y%m%d_%H%M%S");
    let pattern_part = metadata
        .pattern
        .as_ref()
        .map(|p| safe_file_component(p.as_str()))
        .unwrap_or_else(|| "all".to_string());

    match (&metadata.source, metadata.mode) {
        (_, ExtractMode::Images) => {
            format!("filtered_image_links_{}_{}.txt", pattern_part, timestamp)
        }
        (ReportSource::Page(_), ExtractMode::DirectoryListing) => {
            format!("links_{}_{}.txt", metadata.source.name_stem(), timestamp)
        }
        (ReportSource::Page(_), ExtractMode::Links) => {
            format!("{}_{}.txt", metadata.source.name_stem(), timestamp)
        }
        (ReportSource::UrlList(_), _) => format!(
            "{}_links_{}_{}.txt",
            metadata.source.name_stem(),
            pattern_part,
            timestamp
        ),
    }
}

/// Report writer that saves to a fixed text file
#[derive(Debug, Clone)]
pub struct TextFileOutput {
    path: PathBuf,
}

impl TextFileOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportWriter for TextFileOutput {
    fn write_report(&self, report: &BatchReport, metadata: &SaveMetadata) -> OutputResult<()> {
        save_report(&self.path, report, metadata)
    }
}
