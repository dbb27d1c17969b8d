//! Configuration module for Linkrot
//!
//! This module handles loading TOML configuration files, merging command-line
//! overrides, and validating the result.
//!
//! # Example
//!
//! ```no_run
//! use linkrot::config::{load_config, validate};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkrot.toml")).unwrap();
//! validate(&config).unwrap();
//! println!("Crawler will use {} concurrent fetches", config.crawler.max_concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ConfigOverrides, CrawlerConfig, ReportConfig, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_TIMEOUT_MS,
};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config, parse_duration};
pub use validation::validate;
