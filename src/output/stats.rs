//! Batch statistics and the console summary
//!
//! This module condenses a [`BatchReport`] into the counts shown at the end
//! of a run and prints them, along with the error list and the links.

use crate::crawler::{BatchReport, ErrorKind};
use crate::url::MatchPattern;
use colored::Colorize;
use std::collections::BTreeMap;

/// Batch statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStatistics {
    /// URLs in the input
    pub total_urls: usize,

    /// URLs that were attempted (fetched successfully or not)
    pub processed: usize,

    /// URLs rejected before any request
    pub skipped: usize,

    /// Pages that were fetched and scanned
    pub succeeded: usize,

    /// Unique links across all pages
    pub matched_links: usize,

    /// Error counts by kind
    pub error_summary: BTreeMap<ErrorKind, usize>,

    /// Wall-clock duration in milliseconds
    pub duration_ms: i64,
}

impl BatchStatistics {
    pub fn from_report(report: &BatchReport) -> Self {
        Self {
            total_urls: report.total_urls(),
            processed: report.processed_count,
            skipped: report.skipped_count,
            succeeded: report.succeeded_count(),
            matched_links: report.links.len(),
            error_summary: report.error_summary(),
            duration_ms: (report.finished_at - report.started_at).num_milliseconds(),
        }
    }

    pub fn total_errors(&self) -> usize {
        self.error_summary.values().sum()
    }

    /// Share of processed URLs that yielded a page, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            return 0.0;
        }
        (self.succeeded as f64 / self.processed as f64) * 100.0
    }
}

fn pattern_description(pattern: Option<&MatchPattern>) -> String {
    match pattern {
        Some(p) if p.is_regex() => format!("matching /{}/", p.as_str()),
        Some(p) => format!("containing '{}'", p.as_str()),
        None => "(unfiltered)".to_string(),
    }
}

/// Prints the errors recorded during a batch
pub fn print_errors(report: &BatchReport) {
    if report.errors.is_empty() {
        return;
    }

    println!("\n{}", "--- Errors Encountered During Processing ---".yellow().bold());
    for error in &report.errors {
        println!(
            "- {}: {} {}",
            error.url,
            error.message,
            format!("[{}]", error.kind).dimmed()
        );
    }
}

/// Prints the merged link list
pub fn print_links(report: &BatchReport) {
    if report.links.is_empty() {
        return;
    }

    println!("\n{}", "--- Found Links ---".cyan().bold());
    for link in report.links.iter() {
        println!("{}", link);
    }
    println!("{}", "-------------------".cyan());
}

/// Prints the final summary block
///
/// # Arguments
///
/// * `report` - The finalized batch outcome
/// * `label` - What was collected ("links", "image links", ...)
/// * `pattern` - The filter in effect, if any
pub fn print_summary(report: &BatchReport, label: &str, pattern: Option<&MatchPattern>) {
    println!("\n{}", "=== Processing Complete ===".bold());
    for line in summary_lines(report, label, pattern) {
        println!("  {}", line);
    }
}

/// Builds the summary lines; processed, skipped and matched counts are always present
pub fn summary_lines(
    report: &BatchReport,
    label: &str,
    pattern: Option<&MatchPattern>,
) -> Vec<String> {
    let stats = BatchStatistics::from_report(report);
    let mut lines = vec![format!("Processed {} URLs.", stats.processed)];

    let skipped = format!("Skipped {} URLs due to invalid format.", stats.skipped);
    if stats.skipped > 0 {
        lines.push(skipped.yellow().to_string());
    } else {
        lines.push(skipped);
    }

    if stats.total_errors() > 0 {
        let breakdown: Vec<String> = stats
            .error_summary
            .iter()
            .map(|(kind, count)| format!("{} {}", count, kind))
            .collect();
        lines.push(
            format!("Errors: {} ({})", stats.total_errors(), breakdown.join(", "))
                .red()
                .to_string(),
        );
    }
    lines.push(format!(
        "Success Rate: {:.1}% ({} / {} pages fetched)",
        stats.success_rate(),
        stats.succeeded,
        stats.processed
    ));

    let found = format!(
        "Found a total of {} unique {} {}.",
        stats.matched_links,
        label,
        pattern_description(pattern)
    );
    if stats.matched_links > 0 {
        lines.push(found.green().bold().to_string());
    } else if report.has_errors() && stats.succeeded == 0 {
        lines.push(
            format!("No {} were extracted, check the error messages above.", label)
                .red()
                .to_string(),
        );
    } else {
        lines.push(found);
    }
    lines
}
