//! HTML parser for extracting links
//!
//! Parsing goes through html5ever's tree builder (via scraper), which
//! recovers from unclosed and missing tags the way browsers do, so link
//! extraction never fails.

use scraper::{Html, Selector};
use url::Url;

/// Extracts every anchor link from an HTML document
///
/// # Link Extraction Rules
///
/// - Every `<a href="...">` in document order
/// - Relative, absolute-path and protocol-relative hrefs are resolved
///   against `base_url`; absolute hrefs are kept as they are
/// - Anchors with an empty href, or one that does not resolve, are skipped
/// - Duplicates are kept; deduplication belongs to the crawl engine
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The URL of the page, for resolving relative links
///
/// # Returns
///
/// The absolute URLs of all links, in document order
///
/// # Example
///
/// ```
/// use linkrot::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/a"><a href="http://other.com/b">"#;
/// let base_url = Url::parse("http://x.com").unwrap();
/// assert_eq!(
///     extract_links(html, &base_url),
///     vec!["http://x.com/a", "http://other.com/b"]
/// );
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves a link href to an absolute URL
///
/// Absolute hrefs are returned exactly as written. Returns None for empty
/// hrefs and hrefs that fail to resolve.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if Url::parse(href).is_ok() {
        return Some(href.to_string());
    }

    base_url.join(href).ok().map(|url| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://starwars.com").unwrap()
    }

    #[test]
    fn test_absolute_and_relative_links() {
        let html = r#"
<html>
    <body>
        <a href="/characters/luke-skywalker">
            <span>Luke Skywalker</span>
        </a>
        <a href="https://starwars.com/planets/tatooine">
            <span>Tatooine</span>
        </a>
    </body>
</html>
"#;
        assert_eq!(
            extract_links(html, &base_url()),
            vec![
                "https://starwars.com/characters/luke-skywalker",
                "https://starwars.com/planets/tatooine"
            ]
        );
    }

    #[test]
    fn test_empty_body() {
        let html = "<html><body></body></html>";
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_unclosed_anchors() {
        let html = r#"
<html>
    <body>
        <a href="/spaceships/millennium-falcon">
        <a href="https://starwars.com/characters/darth-vader">
    </body>
</html>
"#;
        assert_eq!(
            extract_links(html, &base_url()),
            vec![
                "https://starwars.com/spaceships/millennium-falcon",
                "https://starwars.com/characters/darth-vader"
            ]
        );
    }

    #[test]
    fn test_no_links() {
        let html = "<html><body><p>No links here!</p></body></html>";
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_fragment_without_document_structure() {
        let base = Url::parse("http://x.com").unwrap();
        assert_eq!(
            extract_links(r#"<a href="/a"><a href="http://other.com/b">"#, &base),
            vec!["http://x.com/a", "http://other.com/b"]
        );
    }

    #[test]
    fn test_relative_path_link() {
        let base = Url::parse("https://example.com/docs/intro").unwrap();
        let html = r#"<a href="setup">Setup</a><a href="../about">About</a>"#;
        assert_eq!(
            extract_links(html, &base),
            vec!["https://example.com/docs/setup", "https://example.com/about"]
        );
    }

    #[test]
    fn test_protocol_relative_link() {
        let base = Url::parse("http://example.com/page").unwrap();
        let html = r#"<a href="//cdn.example.com/lib.js">CDN</a>"#;
        assert_eq!(extract_links(html, &base), vec!["http://cdn.example.com/lib.js"]);
    }

    #[test]
    fn test_query_and_fragment_links_kept() {
        let base = Url::parse("https://example.com/list").unwrap();
        let html = r##"<a href="?page=2">Next</a><a href="#top">Top</a>"##;
        assert_eq!(
            extract_links(html, &base),
            vec!["https://example.com/list?page=2", "https://example.com/list#top"]
        );
    }

    #[test]
    fn test_anchor_without_href_skipped() {
        let html = r#"<a name="anchor">Named</a><a href="/real">Real</a>"#;
        assert_eq!(extract_links(html, &base_url()), vec!["https://starwars.com/real"]);
    }

    #[test]
    fn test_empty_href_skipped() {
        let html = r#"<a href="">Empty</a><a href="   ">Blank</a><a href="/kept">Kept</a>"#;
        assert_eq!(extract_links(html, &base_url()), vec!["https://starwars.com/kept"]);
    }

    #[test]
    fn test_unresolvable_href_skipped() {
        let html = r#"<a href="http://exa mple.com/">Bad</a><a href="/ok">Ok</a>"#;
        assert_eq!(extract_links(html, &base_url()), vec!["https://starwars.com/ok"]);
    }

    #[test]
    fn test_absolute_href_kept_as_written() {
        let html = r#"<a href="HTTP://X.com">Upper</a><a href="https://example.com/a/../b?q=1">Dots</a>"#;
        assert_eq!(
            extract_links(html, &base_url()),
            vec!["HTTP://X.com", "https://example.com/a/../b?q=1"]
        );
    }

    #[test]
    fn test_duplicates_kept() {
        let html = r#"<a href="/same">One</a><a href="/same">Two</a>"#;
        assert_eq!(
            extract_links(html, &base_url()),
            vec!["https://starwars.com/same", "https://starwars.com/same"]
        );
    }

    #[test]
    fn test_non_http_schemes_passed_through() {
        let html = r#"<a href="mailto:yoda@dagobah.org">Mail</a>"#;
        assert_eq!(extract_links(html, &base_url()), vec!["mailto:yoda@dagobah.org"]);
    }

    #[test]
    fn test_nested_document_order() {
        let html = r#"
            <nav><a href="/nav">Nav</a></nav>
            <main>
                <div><p><a href="/deep">Deep</a></p></div>
                <a href="/after">After</a>
            </main>
            <footer><a href="/footer">Footer</a></footer>
        "#;
        assert_eq!(
            extract_links(html, &base_url()),
            vec![
                "https://starwars.com/nav",
                "https://starwars.com/deep",
                "https://starwars.com/after",
                "https://starwars.com/footer"
            ]
        );
    }
}
