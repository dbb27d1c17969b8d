//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use linkrot::config::{parse_config, validate, Config, ConfigOverrides, CrawlerConfig};
use linkrot::crawler::{Crawler, HttpFetcher};
use linkrot::output::{format_markdown_report, format_table, CrawlSummary, MarkdownReport, ReportWriter};
use linkrot::{CrawlReport, PageStatus};
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for the given root URL
fn create_test_config(root_url: &str) -> CrawlerConfig {
    CrawlerConfig {
        url: Some(root_url.to_string()),
        max_concurrency: 4,
        timeout_ms: 2_000,
        user_agent: "TestBot/1.0".to_string(),
        ..CrawlerConfig::default()
    }
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    // set_body_string would force text/plain
    ResponseTemplate::new(200).set_body_raw(body.into().into_bytes(), "text/html; charset=utf-8")
}

async fn crawl(config: &CrawlerConfig) -> CrawlReport {
    let fetcher = HttpFetcher::new(&config.user_agent).expect("Failed to build fetcher");
    let crawler = Crawler::new(config, fetcher);
    let root_url = config.url.clone().expect("Test config has a root URL");
    crawler.run(&root_url).await.expect("Crawl failed")
}

#[tokio::test]
async fn test_full_crawl_reports_dead_links() {
    let site = MockServer::start().await;
    let other = MockServer::start().await;
    let base_url = site.uri();
    let other_url = other.uri();

    // Index page linking to every kind of page
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<html><body>
            <a href="/about">About</a>
            <a href="/missing">Missing</a>
            <a href="/files/manual.pdf">Manual</a>
            <a href="{}/external">External</a>
            <a href="mailto:someone@example.com">Mail</a>
            </body></html>"#,
            other_url
        )))
        .expect(1)
        .mount(&site)
        .await;

    // About page links back home, plus a broken link of its own
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html(r#"<a href="/">Home</a><a href="/gone">Gone</a>"#))
        .expect(1)
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/manual.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(vec![0x25, 0x50, 0x44, 0x46]),
        )
        .expect(1)
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(&site)
        .await;

    // External page is checked, but its links are never followed
    Mock::given(method("GET"))
        .and(path("/external"))
        .respond_with(html(r#"<a href="/deeper">Deeper</a>"#))
        .expect(1)
        .mount(&other)
        .await;

    Mock::given(method("GET"))
        .and(path("/deeper"))
        .respond_with(html("<p>never fetched</p>"))
        .expect(0)
        .mount(&other)
        .await;

    let report = crawl(&create_test_config(&format!("{}/", base_url))).await;

    assert!(!report.cancelled);
    // Root, about, missing, manual, external, gone
    assert_eq!(report.outcomes.len(), 6);

    let missing = report
        .outcome_for(&format!("{}/missing", base_url))
        .expect("missing page recorded");
    assert_eq!(missing.status, PageStatus::Dead);
    assert_eq!(missing.source_url, format!("{}/", base_url));
    assert_eq!(
        missing.reason.as_deref(),
        Some("received error status code: 404 Not Found")
    );

    let manual = report
        .outcome_for(&format!("{}/files/manual.pdf", base_url))
        .expect("pdf recorded");
    assert_eq!(manual.status, PageStatus::Dead);
    assert_eq!(manual.reason, None);

    let gone = report
        .outcome_for(&format!("{}/gone", base_url))
        .expect("gone page recorded");
    assert_eq!(gone.source_url, format!("{}/about", base_url));
    assert_eq!(
        gone.reason.as_deref(),
        Some("received error status code: 410 Gone")
    );

    let external = report
        .outcome_for(&format!("{}/external", other_url))
        .expect("external page recorded");
    assert_eq!(external.status, PageStatus::Alive);

    assert_eq!(report.dead_links().len(), 3);
}

#[tokio::test]
async fn test_redirect_to_other_host_not_followed() {
    let site = MockServer::start().await;
    let other = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/go">Go</a>"#))
        .mount(&site)
        .await;

    let landing = format!("{}/landing", other.uri());
    Mock::given(method("GET"))
        .and(path("/go"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", landing.as_str()))
        .expect(1)
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(html(r#"<a href="/only-on-other">Other</a>"#))
        .expect(1)
        .mount(&other)
        .await;

    Mock::given(method("GET"))
        .and(path("/only-on-other"))
        .respond_with(html("<p>never fetched</p>"))
        .expect(0)
        .mount(&other)
        .await;

    let report = crawl(&create_test_config(&site.uri())).await;

    assert_eq!(report.outcomes.len(), 2);
    assert!(report.dead_links().is_empty());
    assert!(report
        .outcome_for(&format!("{}/only-on-other", site.uri()))
        .is_none());
}

#[tokio::test]
async fn test_links_with_same_key_fetched_once() {
    let site = MockServer::start().await;
    let base_url = site.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r##"
            <a href="/docs">Docs</a>
            <a href="/docs/">Docs with slash</a>
            <a href="/docs?lang=en">Docs in English</a>
            <a href="/docs#install">Install section</a>
            <a href="./docs">Relative docs</a>
            "##,
        ))
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path_regex("^/docs"))
        .respond_with(html("<p>docs</p>"))
        .expect(1)
        .mount(&site)
        .await;

    let report = crawl(&create_test_config(&site.uri())).await;

    assert_eq!(report.outcomes.len(), 2);
    assert!(report.dead_links().is_empty());
    assert!(report
        .outcomes
        .iter()
        .all(|outcome| outcome.url.starts_with(&base_url)));
}

#[tokio::test]
async fn test_max_pages_limits_crawl() {
    let site = MockServer::start().await;

    // A chain of pages: / -> /1 -> /2 -> ... -> /10
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/1">next</a>"#))
        .mount(&site)
        .await;

    for i in 1..=10 {
        Mock::given(method("GET"))
            .and(path(format!("/{}", i)))
            .respond_with(html(format!(r#"<a href="/{}">next</a>"#, i + 1)))
            .mount(&site)
            .await;
    }

    let config = CrawlerConfig {
        max_pages: Some(4),
        ..create_test_config(&site.uri())
    };
    let report = crawl(&config).await;

    assert_eq!(report.outcomes.len(), 4);
    assert!(report.dead_links().is_empty());
}

#[tokio::test]
async fn test_timeout_reported_as_dead() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/slow">Slow</a>"#))
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<p>late</p>").set_delay(Duration::from_secs(3)))
        .mount(&site)
        .await;

    let config = CrawlerConfig {
        timeout_ms: 200,
        ..create_test_config(&site.uri())
    };
    let report = crawl(&config).await;

    let dead = report.dead_links();
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].url, format!("{}/slow", site.uri()));
    assert_eq!(dead[0].reason.as_deref(), Some("request timed out after 200ms"));
}

#[tokio::test]
async fn test_report_rendering() {
    let site = MockServer::start().await;
    let base_url = site.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/broken">Broken</a><a href="/logo.png">Logo</a>"#))
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "image/png"))
        .mount(&site)
        .await;

    let report = crawl(&create_test_config(&format!("{}/", base_url))).await;
    let summary = CrawlSummary::from_report(&report);

    assert_eq!(summary.pages_checked, 3);
    assert_eq!(summary.pages_alive, 1);
    assert_eq!(summary.pages_dead, 2);
    assert_eq!(summary.pages_non_html, 1);

    let table = format_table(&summary.dead_links, true);
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Page"));
    assert!(lines[0].ends_with("Reason"));
    assert!(lines[1].contains(&format!("{}/broken", base_url)));
    assert!(lines[1].ends_with("received error status code: 404 Not Found"));
    assert!(lines[2].ends_with(&format!("{}/logo.png", base_url)));

    let without_reason = format_table(&summary.dead_links, false);
    assert!(!without_reason.contains("Reason"));
    assert!(!without_reason.contains("404"));

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let report_path = dir.path().join("dead-links.md");
    MarkdownReport::new(&report_path, true)
        .write_report(&summary)
        .expect("Failed to write markdown report");

    let written = std::fs::read_to_string(&report_path).expect("Failed to read report");
    assert_eq!(written, format_markdown_report(&summary, true));
    assert!(written.contains(&format!("{}/broken", base_url)));
}

#[tokio::test]
async fn test_clean_site_has_no_dead_links() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/a">A</a><a href="/b">B</a>"#))
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(r#"<a href="/b">B</a>"#))
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html(r#"<a href="/a">A</a><a href="/">Home</a>"#))
        .mount(&site)
        .await;

    let report = crawl(&create_test_config(&site.uri())).await;
    let summary = CrawlSummary::from_report(&report);

    assert_eq!(summary.pages_checked, 3);
    assert_eq!(format_table(&summary.dead_links, false), "no dead links found\n");
}

#[tokio::test]
async fn test_config_file_with_overrides() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/nope">Nope</a>"#))
        .mount(&site)
        .await;

    let config = parse_config(
        r#"
[crawler]
url = "http://unused.invalid/"
max-concurrency = 2
timeout-ms = 1000

[report]
print-reason = true
"#,
    )
    .expect("Failed to parse config");

    let config: Config = config.with_overrides(ConfigOverrides {
        url: Some(site.uri()),
        ..ConfigOverrides::default()
    });
    validate(&config).expect("Config should be valid");

    assert_eq!(config.crawler.max_concurrency, 2);
    assert!(config.report.print_reason);

    let report = crawl(&config.crawler).await;
    assert_eq!(report.dead_links().len(), 1);
}
