//! Per-URL progress lines on stdout

use crate::crawler::{BatchError, BatchObserver, LinkSet};
use crate::download::{DownloadFailure, DownloadObserver};
use colored::Colorize;
use std::path::Path;
use url::Url;

/// Prints one progress block per processed URL or download
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleObserver {
    /// Suppresses all output
    pub quiet: bool,
}

impl ConsoleObserver {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl BatchObserver for ConsoleObserver {
    fn on_url_start(&self, index: usize, total: usize, target: &str) {
        if self.quiet {
            return;
        }
        println!(
            "\n{} Processing: {}",
            format!("[{}/{}]", index, total).bold(),
            target
        );
    }

    fn on_skipped(&self, error: &BatchError) {
        if self.quiet {
            return;
        }
        println!("  {}", format!("Skipped: {}", error.message).yellow());
    }

    fn on_page_done(&self, url: &Url, links: &LinkSet) {
        if self.quiet {
            return;
        }
        println!(
            "  Found {} matching links on {}.",
            links.len().to_string().green(),
            url
        );
    }

    fn on_page_failed(&self, error: &BatchError) {
        if self.quiet {
            return;
        }
        println!("  {}", format!("Error: {}", error.message).red());
    }
}

impl DownloadObserver for ConsoleObserver {
    fn on_download_start(&self, index: usize, total: usize, url: &str) {
        if self.quiet {
            return;
        }
        println!(
            "{} {} {}",
            format!("[{}/{}]", index, total).bold(),
            "Downloading:".yellow().bold(),
            url
        );
    }

    fn on_saved(&self, _url: &Url, path: &Path, bytes: u64) {
        if self.quiet {
            return;
        }
        println!(
            "  {} {} ({} bytes)",
            "Saved as:".cyan().bold(),
            path.display(),
            bytes
        );
    }

    fn on_download_failed(&self, failure: &DownloadFailure) {
        if self.quiet {
            return;
        }
        println!(
            "  {} {}: {}",
            "Error downloading".red().bold(),
            failure.url,
            failure.message
        );
    }
}
