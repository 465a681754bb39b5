//! Output module for presenting and saving batch results
//!
//! This module handles:
//! - Writing link lists to text files with a descriptive header
//! - Proposing default file names
//! - Console progress and the final colored summary

mod console;
pub mod stats;
mod text;
mod traits;

pub use console::ConsoleObserver;
pub use stats::{print_errors, print_links, print_summary, summary_lines, BatchStatistics};
pub use text::{default_output_name, format_report, save_report, TextFileOutput, EMPTY_PLACEHOLDER};
pub use traits::{OutputError, OutputResult, ReportSource, ReportWriter, SaveMetadata};

use crate::crawler::BatchReport;

/// Prints the complete console report for a finished batch
///
/// Errors first, then the links, then the summary counts.
pub fn print_report(report: &BatchReport, metadata: &SaveMetadata) {
    print_errors(report);
    print_links(report);
    print_summary(report, metadata.mode.label(), metadata.pattern.as_ref());
}
