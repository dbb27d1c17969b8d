//! Page fetcher implementation
//!
//! This module defines the boundary between the crawl engine and the network:
//! - The `PageFetcher` trait, which any transport can implement
//! - `FetchedPage` and `FetchError`, the raw result of a fetch
//! - `HttpFetcher`, the reqwest-backed implementation used by the binary
//!
//! The fetcher reports what the server said. Deciding whether a page is dead
//! is left to the engine's classifier.

use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Raw response to a page fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// HTTP status code
    pub status: u16,

    /// Response headers, keyed by lowercase name
    pub headers: HashMap<String, String>,

    /// Page body; empty when the response was not HTML
    pub body: String,

    /// URL of the response after redirects; `None` when the fetcher does
    /// not follow redirects
    pub final_url: Option<Url>,
}

impl FetchedPage {
    /// Creates a page with the given status, no headers and an empty body
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: String::new(),
            final_url: None,
        }
    }

    /// Adds a header; the name is stored lowercased
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Sets the body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the URL the response was served from
    pub fn with_final_url(mut self, url: Url) -> Self {
        self.final_url = Some(url);
        self
    }

    /// Looks up a header by name, ignoring case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the Content-Type header value
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// Transport-level fetch failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u128 },

    #[error("failed to make request: {message}")]
    Request { url: String, message: String },

    #[error("failed to read response body: {message}")]
    Body { url: String, message: String },

    #[error("fetch did not complete: {0}")]
    Aborted(String),
}

/// Result of a single fetch
pub type FetchResult = Result<FetchedPage, FetchError>;

/// A transport that can fetch a page
///
/// Implementations must be cheap to share between tasks; the engine holds
/// one behind an `Arc` for the whole run.
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
    /// Fetches `url`, giving up after `timeout`
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult;
}

/// Extracts the lowercase media type from a Content-Type value
///
/// Parameters such as `charset` are dropped. Returns `None` when the value
/// is not of the form `type/subtype`.
///
/// # Examples
///
/// ```
/// use linkrot::crawler::media_type;
///
/// assert_eq!(media_type("Text/HTML; charset=utf-8"), Some("text/html".to_string()));
/// assert_eq!(media_type(""), None);
/// ```
pub fn media_type(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next()?.trim().to_ascii_lowercase();
    let (kind, subtype) = essence.split_once('/')?;

    if kind.is_empty() || subtype.is_empty() || subtype.contains('/') {
        return None;
    }

    Some(essence)
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed (up to 10 hops); the per-request timeout is set on
/// each request rather than on the client.
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header value
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed page fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a new HTTP client
    ///
    /// # Example
    ///
    /// ```no_run
    /// use linkrot::crawler::HttpFetcher;
    ///
    /// let fetcher = HttpFetcher::new("linkrot/1.0").unwrap();
    /// ```
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(user_agent)?))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, timeout, e, ErrorStage::Request))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        let mut page = FetchedPage {
            status,
            headers,
            body: String::new(),
            final_url: Some(final_url),
        };

        // Only HTML bodies are ever parsed
        let is_html = page
            .content_type()
            .and_then(media_type)
            .is_some_and(|mt| mt == "text/html");

        if status < 400 && is_html {
            page.body = response
                .text()
                .await
                .map_err(|e| classify_error(url, timeout, e, ErrorStage::Body))?;
        }

        Ok(page)
    }
}

enum ErrorStage {
    Request,
    Body,
}

fn classify_error(url: &str, timeout: Duration, error: reqwest::Error, stage: ErrorStage) -> FetchError {
    if error.is_timeout() {
        return FetchError::Timeout {
            url: url.to_string(),
            timeout_ms: timeout.as_millis(),
        };
    }

    match stage {
        ErrorStage::Request => FetchError::Request {
            url: url.to_string(),
            message: error.to_string(),
        },
        ErrorStage::Body => FetchError::Body {
            url: url.to_string(),
            message: error.to_string(),
        },
    }
}
