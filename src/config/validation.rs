use crate::config::types::{Config, CrawlerConfig, ReportConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound for concurrent fetches
const MAX_CONCURRENCY_LIMIT: usize = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_report_config(&config.report)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let url = config.url.as_deref().ok_or(ConfigError::MissingUrl)?;
    validate_root_url(url)?;

    if config.max_concurrency < 1 || config.max_concurrency > MAX_CONCURRENCY_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY_LIMIT, config.max_concurrency
        )));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }

    if config.timeout_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout must be >= 1ms, got {}ms",
            config.timeout_ms
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the root URL: absolute, http(s), with a host
fn validate_root_url(url: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root URL '{}': {}", url, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Root URL '{}' must use the http or https scheme",
            url
        )));
    }

    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Root URL '{}' has no host",
            url
        )));
    }

    Ok(())
}

/// Validates report configuration
fn validate_report_config(config: &ReportConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.markdown_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "markdown_path cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}
