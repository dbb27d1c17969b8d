//! Crawl summary statistics

use crate::crawler::CrawlReport;
use crate::state::{PageOutcome, PageStatus};
use chrono::{DateTime, Utc};

/// Summary of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    // Run metadata
    pub root_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub cancelled: bool,

    // Page totals
    pub pages_checked: u64,
    pub pages_alive: u64,
    pub pages_dead: u64,
    pub pages_non_html: u64,

    // Dead outcomes, sorted by source page then link
    pub dead_links: Vec<PageOutcome>,
}

impl CrawlSummary {
    /// Builds the summary of a crawl report
    pub fn from_report(report: &CrawlReport) -> Self {
        let mut summary = Self {
            root_url: report.root_url.clone(),
            started_at: report.started_at,
            finished_at: report.finished_at,
            cancelled: report.cancelled,
            pages_checked: report.outcomes.len() as u64,
            pages_alive: 0,
            pages_dead: 0,
            pages_non_html: 0,
            dead_links: report.dead_links().into_iter().cloned().collect(),
        };

        for outcome in &report.outcomes {
            match outcome.status {
                PageStatus::Alive => summary.pages_alive += 1,
                PageStatus::Dead => summary.pages_dead += 1,
            }
            if outcome.is_non_html() {
                summary.pages_non_html += 1;
            }
        }

        summary
    }

    /// Returns the run duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// Returns the share of checked pages that are dead, as a percentage
    pub fn dead_rate(&self) -> f64 {
        if self.pages_checked == 0 {
            return 0.0;
        }
        (self.pages_dead as f64 / self.pages_checked as f64) * 100.0
    }
}
