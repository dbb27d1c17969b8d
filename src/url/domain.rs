use url::Url;

/// Extracts the host of a URL in the form used by normalized keys
///
/// The host is lowercased. A port is appended only when the URL names one
/// that differs from the scheme's default, so `http://a.com:80` and
/// `http://a.com` share a host key.
///
/// # Arguments
///
/// * `url` - The URL to extract the host from
///
/// # Returns
///
/// * `Some(String)` - The lowercase host, with `:port` when explicit
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use linkrot::url::host_key;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(host_key(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(host_key(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();

    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Returns true if both URLs point at the same host and port
pub fn is_same_host(a: &Url, b: &Url) -> bool {
    match (host_key(a), host_key(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
