//! Terminal table report
//!
//! Columns are padded to the widest cell plus one space, the last column is
//! left unpadded.

use crate::output::{CrawlSummary, OutputResult, ReportWriter};
use crate::state::PageOutcome;
use colored::Colorize;
use std::io::Write;

/// Message printed instead of a table when nothing is dead
pub const NO_DEAD_LINKS: &str = "no dead links found";

/// Formats dead outcomes as a plain text table
///
/// # Arguments
///
/// * `dead` - Dead outcomes, in the order they should be listed
/// * `print_reason` - Add a `Reason` column
///
/// # Returns
///
/// The table with a `Page`/`Link` header row and one row per outcome, or
/// the no-dead-links message when `dead` is empty
pub fn format_table(dead: &[PageOutcome], print_reason: bool) -> String {
    if dead.is_empty() {
        return format!("{}\n", NO_DEAD_LINKS);
    }

    let mut rows: Vec<Vec<&str>> = Vec::with_capacity(dead.len() + 1);
    let header: &[&str] = if print_reason {
        &["Page", "Link", "Reason"]
    } else {
        &["Page", "Link"]
    };
    rows.push(header.to_vec());

    for outcome in dead {
        let mut row = vec![outcome.source_url.as_str(), outcome.url.as_str()];
        if print_reason {
            row.push(outcome.reason.as_deref().unwrap_or(""));
        }
        rows.push(row);
    }

    let columns = header.len();
    let widths: Vec<usize> = (0..columns)
        .map(|col| rows.iter().map(|row| row[col].chars().count()).max().unwrap_or(0))
        .collect();

    let mut table = String::new();
    for row in &rows {
        let mut line = String::new();
        for (col, cell) in row.iter().enumerate() {
            if col + 1 == columns {
                line.push_str(cell);
            } else {
                line.push_str(&format!("{:<width$} ", cell, width = widths[col]));
            }
        }
        table.push_str(line.trim_end());
        table.push('\n');
    }

    table
}

/// Prints the dead link table to stdout, header in green
pub struct TableReport {
    print_reason: bool,
}

impl TableReport {
    pub fn new(print_reason: bool) -> Self {
        Self { print_reason }
    }

    /// Renders the table with terminal colors applied
    pub fn render(&self, summary: &CrawlSummary) -> String {
        let table = format_table(&summary.dead_links, self.print_reason);
        if summary.dead_links.is_empty() {
            return table;
        }

        match table.split_once('\n') {
            Some((header, rest)) => format!("{}\n{}", header.green().bold(), rest),
            None => table,
        }
    }
}

impl ReportWriter for TableReport {
    fn write_report(&self, summary: &CrawlSummary) -> OutputResult<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(self.render(summary).as_bytes())?;

        if summary.cancelled {
            writeln!(stdout, "{}", "crawl was interrupted; results are partial".yellow())?;
        }
        stdout.flush()?;

        Ok(())
    }
}
