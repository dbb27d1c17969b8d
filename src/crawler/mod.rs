//! Crawler module for page fetching and link checking
//!
//! This module contains the core crawling logic, including:
//! - The `PageFetcher` trait and its HTTP implementation
//! - Classification of fetch results into alive and dead pages
//! - HTML link extraction
//! - Coalescing of concurrent fetches for the same URL
//! - The concurrent crawl engine tying them together

mod classify;
mod coalescer;
mod engine;
mod fetcher;
mod parser;

pub use classify::{classify, Classification, EXPECTED_MEDIA_TYPE};
pub use coalescer::RequestCoalescer;
pub use engine::{CrawlReport, CrawlTask, Crawler};
pub use fetcher::{
    build_http_client, media_type, FetchError, FetchResult, FetchedPage, HttpFetcher, PageFetcher,
};
pub use parser::extract_links;
