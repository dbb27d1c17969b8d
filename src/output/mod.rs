//! Output module for crawl reports
//!
//! This module handles:
//! - Summarizing a finished crawl into totals and a sorted dead link list
//! - Printing the dead link table to the terminal
//! - Writing an optional markdown report file

mod markdown;
mod summary;
mod table;
mod traits;

pub use markdown::{format_markdown_report, MarkdownReport};
pub use summary::CrawlSummary;
pub use table::{format_table, TableReport, NO_DEAD_LINKS};
pub use traits::{OutputError, OutputResult, ReportWriter};
