//! Sequential bulk downloader
//!
//! This module downloads a list of file URLs one after another into a
//! directory, including:
//! - Naming files by a running counter or by their original name
//! - Streaming response bodies straight to disk
//! - Recording failures and continuing with the next URL

mod naming;

pub use naming::{extension_of, numbered_name, original_name, FALLBACK_NAME};

use crate::config::{Config, DefaultScheme, FetchConfig, NamingScheme};
use crate::crawler::{classify_error, FetchError, NoopObserver};
use crate::url::{add_scheme_if_missing, validate_target};
use crate::SieveError;
use futures::StreamExt;
use reqwest::{redirect::Policy, Client};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use url::Url;

/// Why a single download failed
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Download settings
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Target directory, created if missing
    pub directory: PathBuf,
    pub naming: NamingScheme,
    /// Scheme prepended to URLs that have none
    pub default_scheme: DefaultScheme,
    /// Used for timeout messages
    pub connect_timeout: Duration,
}

impl DownloadOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            directory: PathBuf::from(&config.download.directory),
            naming: config.download.naming,
            default_scheme: config.download.default_scheme,
            connect_timeout: config.fetch.connect_timeout(),
        }
    }
}

/// One failed download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadFailure {
    pub url: String,
    pub message: String,
}

/// Outcome of a bulk download
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    /// Non-blank URLs that were tried
    pub attempted: usize,
    /// Files written, in order
    pub saved: Vec<PathBuf>,
    pub failures: Vec<DownloadFailure>,
}

/// Progress callbacks for a bulk download
pub trait DownloadObserver {
    fn on_download_start(&self, _index: usize, _total: usize, _url: &str) {}

    fn on_saved(&self, _url: &Url, _path: &Path, _bytes: u64) {}

    fn on_download_failed(&self, _failure: &DownloadFailure) {}
}

impl DownloadObserver for NoopObserver {}

/// Builds the HTTP client used for downloads
///
/// Identical to the page client except that there is no overall request
/// timeout, since bodies can be arbitrarily large. Connecting is still
/// bounded.
pub fn build_download_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::limited(config.max_redirects))
        .build()
}

/// Downloads every URL into the configured directory
///
/// URLs are processed in order. Blank entries are ignored. A failed
/// download is recorded and the run moves on; in numbered mode the counter
/// only advances when a file was saved, so successful files are numbered
/// without gaps.
///
/// # Arguments
///
/// * `urls` - File URLs; a missing scheme gets the configured default
/// * `client` - HTTP client, see [`build_download_client`]
/// * `options` - Directory, naming and scheme settings
/// * `observer` - Progress callbacks
///
/// # Returns
///
/// * `Ok(DownloadReport)` - The run completed (possibly with failures)
/// * `Err(SieveError::Io)` - The target directory could not be created
pub async fn download_all(
    urls: &[String],
    client: &Client,
    options: &DownloadOptions,
    observer: &dyn DownloadObserver,
) -> Result<DownloadReport, SieveError> {
    fs::create_dir_all(&options.directory).await?;
    tracing::info!("Saving downloads to {}", options.directory.display());

    let targets: Vec<&str> = urls
        .iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .collect();
    let total = targets.len();

    let mut report = DownloadReport::default();
    let mut counter = 1;

    for (i, target) in targets.into_iter().enumerate() {
        observer.on_download_start(i + 1, total, target);
        report.attempted += 1;

        let url = match validate_target(&add_scheme_if_missing(target, options.default_scheme)) {
            Ok(url) => url,
            Err(e) => {
                let failure = DownloadFailure {
                    url: target.to_string(),
                    message: DownloadError::InvalidUrl(e.to_string()).to_string(),
                };
                tracing::warn!("Skipping {}: {}", target, failure.message);
                observer.on_download_failed(&failure);
                report.failures.push(failure);
                continue;
            }
        };

        let name = match options.naming {
            NamingScheme::Numbered => numbered_name(counter, &url),
            NamingScheme::Original => original_name(&url),
        };
        let path = options.directory.join(name);

        match download_file(client, &url, &path, options.connect_timeout).await {
            Ok(bytes) => {
                tracing::debug!("Saved {} ({} bytes) to {}", url, bytes, path.display());
                observer.on_saved(&url, &path, bytes);
                report.saved.push(path);
                counter += 1;
            }
            Err(e) => {
                let failure = DownloadFailure {
                    url: url.to_string(),
                    message: e.to_string(),
                };
                tracing::warn!("Failed to download {}: {}", url, failure.message);
                observer.on_download_failed(&failure);
                report.failures.push(failure);
            }
        }
    }

    tracing::info!(
        "Download finished: {} attempted, {} saved, {} failed",
        report.attempted,
        report.saved.len(),
        report.failures.len()
    );

    Ok(report)
}

/// Streams one response body to `path`
///
/// A partially written file is removed when the transfer fails.
async fn download_file(
    client: &Client,
    url: &Url,
    path: &Path,
    timeout: Duration,
) -> Result<u64, DownloadError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify_error(url, timeout, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        }
        .into());
    }

    let write_error = |source: std::io::Error| DownloadError::Write {
        path: path.display().to_string(),
        source,
    };

    let mut file = File::create(path).await.map_err(write_error)?;
    let result = stream_body(response, &mut file, url, path, timeout).await;

    match result {
        Ok(bytes) => {
            file.flush().await.map_err(write_error)?;
            Ok(bytes)
        }
        Err(e) => {
            drop(file);
            if let Err(remove_err) = fs::remove_file(path).await {
                tracing::debug!("Could not remove partial file {}: {}", path.display(), remove_err);
            }
            Err(e)
        }
    }
}

async fn stream_body(
    response: reqwest::Response,
    file: &mut File,
    url: &Url,
    path: &Path,
    timeout: Duration,
) -> Result<u64, DownloadError> {
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| classify_error(url, timeout, e))?;
        file.write_all(&chunk)
            .await
            .map_err(|source| DownloadError::Write {
                path: path.display().to_string(),
                source,
            })?;
        written += chunk.len() as u64;
    }

    Ok(written)
}
