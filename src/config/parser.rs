use crate::config::types::Config;
use crate::ConfigError;
use std::path::Path;
use std::time::Duration;

/// Loads and parses a configuration file from the given path
///
/// The result is not validated: the root URL may still come from the command
/// line. Call [`validate`](crate::config::validate) once overrides are applied.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded configuration
/// * `Err(ConfigError)` - Failed to read or parse the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use linkrot::config::load_config;
///
/// let config = load_config(Path::new("linkrot.toml")).unwrap();
/// println!("Max concurrency: {}", config.crawler.max_concurrency);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses a configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    Ok(config)
}

/// Parses a human-friendly duration
///
/// Accepts a number followed by `ms`, `s` or `m`; a bare number is read as
/// seconds. Fractions are allowed (`1.5s`).
///
/// # Examples
///
/// ```
/// use linkrot::config::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
/// assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
/// assert_eq!(parse_duration("2").unwrap(), Duration::from_secs(2));
/// ```
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let trimmed = input.trim();

    let (number, seconds_per_unit) = if let Some(n) = trimmed.strip_suffix("ms") {
        (n, 0.001)
    } else if let Some(n) = trimmed.strip_suffix('s') {
        (n, 1.0)
    } else if let Some(n) = trimmed.strip_suffix('m') {
        (n, 60.0)
    } else {
        (trimmed, 1.0)
    };

    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidDuration(input.to_string()))?;

    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidDuration(input.to_string()));
    }

    Duration::try_from_secs_f64(value * seconds_per_unit)
        .map_err(|_| ConfigError::InvalidDuration(input.to_string()))
}
