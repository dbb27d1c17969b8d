//! Linkrot main entry point
//!
//! This is the command-line interface for the Linkrot dead link finder.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use linkrot::config::{load_config, parse_duration, validate, Config, ConfigOverrides};
use linkrot::crawler::{Crawler, HttpFetcher};
use linkrot::output::{CrawlSummary, MarkdownReport, ReportWriter, TableReport};
use linkrot::ConfigError;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Linkrot: a dead link finder
///
/// Linkrot crawls a website from a root URL, follows links that stay on the
/// same host, and reports every link that is unreachable, returns an error
/// status, or does not serve HTML.
#[derive(Parser, Debug)]
#[command(name = "linkrot")]
#[command(version)]
#[command(about = "Find dead links on a website", long_about = None)]
struct Cli {
    /// Root URL to start crawling from
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Maximum number of concurrent fetches [default: 10]
    #[arg(long, value_name = "N")]
    max_concurrency: Option<usize>,

    /// Stop taking new pages once this many have been checked
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Per-fetch timeout, e.g. 500ms, 5s, 2m [default: 5s]
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    timeout: Option<Duration>,

    /// Add the failure reason to the report
    #[arg(long)]
    print_reason: bool,

    /// Path to TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Also write a markdown report to this path
    #[arg(long, value_name = "PATH")]
    report: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e @ ConfigError::MissingUrl) => {
            Cli::command().error(ErrorKind::MissingRequiredArgument, e).exit()
        }
        Err(e @ ConfigError::InvalidUrl(_)) => {
            Cli::command().error(ErrorKind::ValueValidation, e).exit()
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkrot=info,warn"),
            1 => EnvFilter::new("linkrot=debug,info"),
            2 => EnvFilter::new("linkrot=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so the report on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file if given, applies command-line flags, and validates
fn build_config(cli: &Cli) -> Result<Config, ConfigError> {
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => Config::default(),
    };

    let config = config.with_overrides(ConfigOverrides {
        url: cli.url.clone(),
        max_concurrency: cli.max_concurrency,
        max_pages: cli.max_pages,
        timeout: cli.timeout,
        print_reason: cli.print_reason,
        markdown_path: cli.report.clone(),
    });

    validate(&config)?;
    Ok(config)
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let root_url = config.crawler.url.clone().ok_or(ConfigError::MissingUrl)?;

    let fetcher = match HttpFetcher::new(&config.crawler.user_agent) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            tracing::error!("Failed to build HTTP client: {}", e);
            return Err(e.into());
        }
    };

    let crawler = Crawler::new(&config.crawler, fetcher);

    let cancel = crawler.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping crawl and reporting partial results");
            cancel.cancel();
        }
    });

    let report = match crawler.run(&root_url).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    let summary = CrawlSummary::from_report(&report);
    tracing::info!(
        "{} pages checked, {} dead ({} not HTML)",
        summary.pages_checked,
        summary.pages_dead,
        summary.pages_non_html
    );

    TableReport::new(config.report.print_reason).write_report(&summary)?;

    if let Some(path) = &config.report.markdown_path {
        MarkdownReport::new(path, config.report.print_reason).write_report(&summary)?;
    }

    Ok(())
}
