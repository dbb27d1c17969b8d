//! Fetch result classification
//!
//! Turns the raw result of a fetch into the engine's view of the page.
//!
//! | Condition | Classification |
//! |-----------|----------------|
//! | Transport error or timeout | Dead, reason = error message |
//! | HTTP status >= 400 | Dead, reason = status code and text |
//! | Missing/unparseable Content-Type | Dead, reason = media type error |
//! | Media type other than text/html | NotHtml (dead, no reason) |
//! | Otherwise | Alive |

use crate::crawler::fetcher::{media_type, FetchResult, FetchedPage};
use reqwest::StatusCode;

/// The only media type whose pages are alive and get their links followed
pub const EXPECTED_MEDIA_TYPE: &str = "text/html";

/// How a fetched page is treated by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// HTML page with a non-error status
    Alive(FetchedPage),

    /// The page is broken
    Dead { reason: String },

    /// The page works but is not HTML
    NotHtml { content_type: String },
}

/// Classifies the result of a fetch
pub fn classify(result: FetchResult) -> Classification {
    let page = match result {
        Ok(page) => page,
        Err(e) => {
            return Classification::Dead {
                reason: e.to_string(),
            }
        }
    };

    if page.status >= 400 {
        return Classification::Dead {
            reason: status_reason(page.status),
        };
    }

    let Some(content_type) = page.content_type() else {
        return Classification::Dead {
            reason: "failed to parse media type: no media type".to_string(),
        };
    };

    match media_type(content_type) {
        None => Classification::Dead {
            reason: format!("failed to parse media type: {:?}", content_type),
        },
        Some(mt) if mt != EXPECTED_MEDIA_TYPE => Classification::NotHtml {
            content_type: content_type.to_string(),
        },
        Some(_) => Classification::Alive(page),
    }
}

fn status_reason(status: u16) -> String {
    let text = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason());

    match text {
        Some(text) => format!("received error status code: {} {}", status, text),
        None => format!("received error status code: {}", status),
    }
}
