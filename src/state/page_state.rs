/// Page outcome definitions for crawl results
///
/// This module defines the status a processed page ends up in and the
/// outcome record stored for it in the visited registry.
use std::fmt;

/// Represents the final status of a processed page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageStatus {
    /// Page was fetched and served HTML with a non-error status
    Alive,

    /// Page could not be fetched, returned an error status, or is not HTML
    Dead,
}

impl PageStatus {
    /// Returns true if this page belongs in the dead link report
    pub fn is_dead(&self) -> bool {
        matches!(self, Self::Dead)
    }

    /// Returns the lowercase name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alive => "alive",
            Self::Dead => "dead",
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of processing one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    /// The raw URL as first observed
    pub url: String,

    /// The raw URL of the page that linked here; the root is its own source
    pub source_url: String,

    /// Final status
    pub status: PageStatus,

    /// Failure description; `None` for alive pages and for non-HTML pages
    pub reason: Option<String>,
}

impl PageOutcome {
    /// Creates an outcome for a page that served HTML
    pub fn alive(url: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source_url: source_url.into(),
            status: PageStatus::Alive,
            reason: None,
        }
    }

    /// Creates an outcome for a page that failed
    ///
    /// Pass `None` as the reason for an expected failure such as a non-HTML
    /// content type, which the report lists without explanation.
    pub fn dead(
        url: impl Into<String>,
        source_url: impl Into<String>,
        reason: Option<String>,
    ) -> Self {
        Self {
            url: url.into(),
            source_url: source_url.into(),
            status: PageStatus::Dead,
            reason,
        }
    }

    /// Returns true if the page is dead because it did not serve HTML
    pub fn is_non_html(&self) -> bool {
        self.status.is_dead() && self.reason.is_none()
    }
}
