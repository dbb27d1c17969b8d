//! Report writer trait and output errors
//!
//! This module defines the interface shared by the terminal table and the
//! markdown file report.

use crate::output::CrawlSummary;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for report writers
///
/// A writer renders a finished crawl somewhere: the terminal, a file, or a
/// buffer in tests.
pub trait ReportWriter {
    /// Writes the report for a finished crawl
    ///
    /// # Arguments
    ///
    /// * `summary` - Totals and dead links of the crawl
    fn write_report(&self, summary: &CrawlSummary) -> OutputResult<()>;
}
