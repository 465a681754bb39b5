use serde::Deserialize;
use std::time::Duration;

/// Browser-like client identifier sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Main configuration structure for link-sieve
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

/// Which fetch implementation retrieves page markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategyKind {
    /// Plain HTTP GET via reqwest
    #[default]
    Http,
    /// Headless Chromium; returns the rendered DOM
    Browser,
}

/// Scheme prefixed to targets that were given without one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultScheme {
    Http,
    Https,
}

impl DefaultScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

/// How the downloader names the files it writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingScheme {
    /// `1.jpg`, `2.pdf`, `3` ... in list order
    #[default]
    Numbered,
    /// Last path segment of the URL
    Original,
}

/// Fetch collaborator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Fetch implementation to use
    #[serde(default)]
    pub strategy: FetchStrategyKind,

    /// Per-page request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// TCP connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Maximum redirect hops followed per request
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,

    /// User-Agent header value
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            strategy: FetchStrategyKind::default(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
        }
    }
}

/// Link filtering knobs
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Drop `data:` references before resolution
    #[serde(rename = "exclude-data-uris", default = "default_true")]
    pub exclude_data_uris: bool,

    /// Scheme assumed for scrape targets given without one
    #[serde(rename = "default-scheme", default = "default_https")]
    pub default_scheme: DefaultScheme,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude_data_uris: true,
            default_scheme: DefaultScheme::Https,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory that default-named result files are written to
    #[serde(default = "default_output_directory")]
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

/// Bulk downloader configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadConfig {
    /// Directory downloads are saved into (created if missing)
    #[serde(default = "default_download_directory")]
    pub directory: String,

    /// File naming scheme
    #[serde(default)]
    pub naming: NamingScheme,

    /// Scheme assumed for download URLs given without one
    #[serde(rename = "default-scheme", default = "default_http")]
    pub default_scheme: DefaultScheme,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: default_download_directory(),
            naming: NamingScheme::default(),
            default_scheme: DefaultScheme::Http,
        }
    }
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    10
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_true() -> bool {
    true
}

fn default_https() -> DefaultScheme {
    DefaultScheme::Https
}

fn default_http() -> DefaultScheme {
    DefaultScheme::Http
}

fn default_output_directory() -> String {
    ".".to_string()
}

fn default_download_directory() -> String {
    "bulk_downloads".to_string()
}
