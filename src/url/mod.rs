//! URL handling module for Linkrot
//!
//! This module provides URL normalization and host comparison. Normalized
//! keys are the crawl's cycle-detection currency: two URLs that differ only
//! in scheme case, host case, trailing slash, query or fragment share a key.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{host_key, is_same_host};
pub use normalize::{normalize_url, NormalizedUrl};
