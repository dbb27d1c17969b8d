use serde::Deserialize;
use std::time::Duration;

/// Default number of concurrent fetches
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// Default per-fetch timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Main configuration structure for Linkrot
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Root URL to start crawling from
    #[serde(default)]
    pub url: Option<String>,

    /// Maximum number of concurrent page fetches
    #[serde(rename = "max-concurrency", default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Soft cap on recorded pages; unbounded when absent
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<usize>,

    /// Per-fetch timeout (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Report output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    /// Include the failure reason column in the report
    #[serde(rename = "print-reason", default)]
    pub print_reason: bool,

    /// Path of an optional markdown report file
    #[serde(rename = "markdown-path", default)]
    pub markdown_path: Option<String>,
}

/// Values given on the command line, applied on top of a config file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub url: Option<String>,
    pub max_concurrency: Option<usize>,
    pub max_pages: Option<usize>,
    pub timeout: Option<Duration>,
    pub print_reason: bool,
    pub markdown_path: Option<String>,
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_user_agent() -> String {
    format!("linkrot/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_concurrency: default_max_concurrency(),
            max_pages: None,
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl CrawlerConfig {
    /// Returns the per-fetch timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Applies command-line values over this configuration
    ///
    /// Options that were not given on the command line keep their file or
    /// default value. `print_reason` can only be switched on.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(url) = overrides.url {
            self.crawler.url = Some(url);
        }
        if let Some(max_concurrency) = overrides.max_concurrency {
            self.crawler.max_concurrency = max_concurrency;
        }
        if let Some(max_pages) = overrides.max_pages {
            self.crawler.max_pages = Some(max_pages);
        }
        if let Some(timeout) = overrides.timeout {
            self.crawler.timeout_ms = timeout.as_millis().try_into().unwrap_or(u64::MAX);
        }
        if overrides.print_reason {
            self.report.print_reason = true;
        }
        if let Some(path) = overrides.markdown_path {
            self.report.markdown_path = Some(path);
        }
        self
    }
}
