//! State module for tracking crawl results
//!
//! This module provides the per-page outcome types and the registry that
//! deduplicates pages across concurrent crawl tasks.
//!
//! # Components
//!
//! - `PageStatus`: Whether a processed page is alive or dead
//! - `PageOutcome`: The recorded result for one URL
//! - `VisitedRegistry`: Claim-or-join map from normalized key to outcome

mod page_state;
mod registry;

// Re-export main types
pub use page_state::{PageOutcome, PageStatus};
pub use registry::{Claim, VisitedRegistry};
