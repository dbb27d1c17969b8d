//! Markdown report generation
//!
//! This module writes a human-readable markdown report of a crawl: run
//! information, page totals and the dead link table.

use crate::output::{CrawlSummary, OutputResult, ReportWriter};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes the crawl report to a markdown file
pub struct MarkdownReport {
    path: PathBuf,
    print_reason: bool,
}

impl MarkdownReport {
    pub fn new(path: impl AsRef<Path>, print_reason: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            print_reason,
        }
    }
}

impl ReportWriter for MarkdownReport {
    fn write_report(&self, summary: &CrawlSummary) -> OutputResult<()> {
        let markdown = format_markdown_report(summary, self.print_reason);

        let mut file = File::create(&self.path)?;
        file.write_all(markdown.as_bytes())?;

        tracing::info!("Wrote markdown report to {}", self.path.display());
        Ok(())
    }
}

/// Formats a crawl summary as markdown
///
/// # Arguments
///
/// * `summary` - The crawl summary data
/// * `print_reason` - Add a reason column to the dead link table
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_report(summary: &CrawlSummary, print_reason: bool) -> String {
    let mut md = String::new();

    md.push_str("# Dead Link Report\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Root URL**: {}\n", summary.root_url));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", summary.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        summary.duration_seconds()
    ));
    let status = if summary.cancelled {
        "interrupted"
    } else {
        "completed"
    };
    md.push_str(&format!("- **Status**: {}\n\n", status));

    // Totals
    md.push_str("## Statistics\n\n");
    md.push_str("| Pages | Count |\n");
    md.push_str("|-------|-------|\n");
    md.push_str(&format!("| Checked | {} |\n", summary.pages_checked));
    md.push_str(&format!("| Alive | {} |\n", summary.pages_alive));
    md.push_str(&format!("| Dead | {} |\n", summary.pages_dead));
    md.push_str(&format!("| Not HTML | {} |\n\n", summary.pages_non_html));
    md.push_str(&format!("- **Dead Rate**: {:.2}%\n\n", summary.dead_rate()));

    md.push_str("## Dead Links\n\n");

    if summary.dead_links.is_empty() {
        md.push_str("No dead links found.\n");
        return md;
    }

    if print_reason {
        md.push_str("| Page | Link | Reason |\n");
        md.push_str("|------|------|--------|\n");
    } else {
        md.push_str("| Page | Link |\n");
        md.push_str("|------|------|\n");
    }

    for outcome in &summary.dead_links {
        md.push_str(&format!(
            "| {} | {} |",
            escape_cell(&outcome.source_url),
            escape_cell(&outcome.url)
        ));
        if print_reason {
            md.push_str(&format!(
                " {} |",
                escape_cell(outcome.reason.as_deref().unwrap_or(""))
            ));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
