use crate::url::domain::host_key;
use crate::UrlError;
use url::{ParseError, Url};

/// A URL together with its deduplication key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl {
    /// Lower-cased host (plus explicit port) followed by the cleaned path
    pub key: String,

    /// The parsed input URL, query and fragment intact
    pub url: Url,
}

/// Normalizes a URL into the key used for cycle detection
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject schemes other than http and https
/// 3. Lowercase the host, keep a non-default port
/// 4. Normalize path:
///    - Remove dot segments (. and ..)
///    - Collapse repeated slashes
///    - Remove trailing slash (the root path becomes empty)
/// 5. Drop the scheme, query and fragment
///
/// Input without a scheme is read as `host/path`, which makes every key a
/// fixed point: normalizing a key yields the same key.
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(NormalizedUrl)` - The key and the parsed URL
/// * `Err(UrlError)` - Failed to parse the URL or unsupported scheme
///
/// # Examples
///
/// ```
/// use linkrot::url::normalize_url;
///
/// let normalized = normalize_url("HTTP://Example.com/wiki/../wiki/Page/?a=1#top").unwrap();
/// assert_eq!(normalized.key, "example.com/wiki/Page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<NormalizedUrl, UrlError> {
    let url = parse(url_str)?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = host_key(&url).ok_or(UrlError::MissingHost)?;
    let key = format!("{}{}", host, normalize_path(url.path()));

    Ok(NormalizedUrl { key, url })
}

fn parse(url_str: &str) -> Result<Url, UrlError> {
    match Url::parse(url_str) {
        Ok(url) => Ok(url),
        Err(ParseError::RelativeUrlWithoutBase)
            if !url_str.contains("://") && !url_str.starts_with('/') =>
        {
            Url::parse(&format!("http://{}", url_str)).map_err(|e| UrlError::Parse(e.to_string()))
        }
        Err(e) => Err(UrlError::Parse(e.to_string())),
    }
}

/// Normalizes a URL path by removing dot segments, empty segments and the trailing slash
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return String::new();
    }

    format!("/{}", segments.join("/"))
}
