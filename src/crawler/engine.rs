//! Crawl engine
//!
//! Every discovered link becomes a task on the tokio runtime. A task moves
//! through the following states:
//!
//! ```text
//! Pending -> Claiming -> Skipped
//!                     -> Fetching -> Classifying -> Recording -> Fanning-Out -> Done
//! ```
//!
//! The visited registry decides which task owns a page, the request
//! coalescer shares fetches for identical raw URLs, and a semaphore bounds
//! the number of fetches on the wire. The run ends once the root task and
//! all of its descendants have finished.

use crate::config::CrawlerConfig;
use crate::crawler::classify::{classify, Classification};
use crate::crawler::coalescer::RequestCoalescer;
use crate::crawler::fetcher::{FetchError, FetchResult, PageFetcher};
use crate::crawler::parser::extract_links;
use crate::state::{Claim, PageOutcome, VisitedRegistry};
use crate::url::{is_same_host, normalize_url};
use crate::LinkrotError;
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use url::Url;

/// Log progress every this many recorded pages
const PROGRESS_INTERVAL: usize = 25;

/// A link waiting to be checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// The raw URL as found in the page
    pub url: String,

    /// The raw URL of the page that linked here
    pub source_url: String,
}

impl CrawlTask {
    pub fn new(url: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source_url: source_url.into(),
        }
    }

    /// The root task is its own source
    pub fn root(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            source_url: url.clone(),
            url,
        }
    }
}

/// Result of a finished crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// The root URL the crawl started from
    pub root_url: String,

    /// One outcome per distinct page, in no particular order
    pub outcomes: Vec<PageOutcome>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// True when the run was cancelled before every task finished
    pub cancelled: bool,
}

impl CrawlReport {
    /// Returns the dead outcomes sorted by source page, then by link
    pub fn dead_links(&self) -> Vec<&PageOutcome> {
        let mut dead: Vec<&PageOutcome> = self
            .outcomes
            .iter()
            .filter(|outcome| outcome.status.is_dead())
            .collect();

        dead.sort_by(|a, b| {
            a.source_url
                .cmp(&b.source_url)
                .then_with(|| a.url.cmp(&b.url))
        });
        dead
    }

    /// Returns the recorded outcome for a raw URL
    pub fn outcome_for(&self, url: &str) -> Option<&PageOutcome> {
        self.outcomes.iter().find(|outcome| outcome.url == url)
    }
}

/// Dead link crawler
///
/// The crawler is generic over its [`PageFetcher`], so the engine can be
/// driven by the HTTP fetcher in the binary and by an in-memory fetcher in
/// tests.
///
/// # Example
///
/// ```no_run
/// use linkrot::config::CrawlerConfig;
/// use linkrot::crawler::{Crawler, HttpFetcher};
///
/// # async fn example() -> linkrot::Result<()> {
/// let config = CrawlerConfig::default();
/// let fetcher = HttpFetcher::new(&config.user_agent)?;
/// let crawler = Crawler::new(&config, fetcher);
///
/// let report = crawler.run("https://example.com").await?;
/// for outcome in report.dead_links() {
///     println!("{} -> {}", outcome.source_url, outcome.url);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Crawler<F: PageFetcher> {
    fetcher: Arc<F>,
    config: CrawlerConfig,
    cancel: CancellationToken,
}

impl<F: PageFetcher> Crawler<F> {
    /// Creates a crawler from the crawler settings and a fetch backend
    pub fn new(config: &CrawlerConfig, fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            config: config.clone(),
            cancel: CancellationToken::new(),
        }
    }

    /// Returns a token that stops every run of this crawler when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Crawls from `root_url` and returns every recorded outcome
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The crawl finished or was cancelled
    /// * `Err(LinkrotError)` - The root URL could not be parsed
    pub async fn run(&self, root_url: &str) -> Result<CrawlReport, LinkrotError> {
        let root = normalize_url(root_url)?;
        let started_at = Utc::now();

        tracing::info!(
            "Starting crawl of {} ({} concurrent fetches, {:?} timeout)",
            root_url,
            self.config.max_concurrency,
            self.config.timeout()
        );

        let run = Arc::new(CrawlRun {
            fetcher: Arc::clone(&self.fetcher),
            registry: VisitedRegistry::new(),
            coalescer: RequestCoalescer::new(),
            fetch_slots: Arc::new(Semaphore::new(self.config.max_concurrency.max(1))),
            tracker: TaskTracker::new(),
            cancel: self.cancel.child_token(),
            root: root.url,
            timeout: self.config.timeout(),
            max_pages: self.config.max_pages,
            started: Instant::now(),
        });

        run.spawn(CrawlTask::root(root_url));

        // Tasks may still spawn children after close; wait() only resolves
        // once the tracker is closed and empty.
        run.tracker.close();
        run.tracker.wait().await;

        let cancelled = run.cancel.is_cancelled();
        let outcomes = run.registry.snapshot_outcomes();

        if cancelled {
            tracing::warn!(
                "Crawl cancelled after {} pages in {:?}",
                outcomes.len(),
                run.started.elapsed()
            );
        } else {
            tracing::info!(
                "Crawl completed: {} pages checked in {:?}",
                outcomes.len(),
                run.started.elapsed()
            );
        }

        Ok(CrawlReport {
            root_url: root_url.to_string(),
            outcomes,
            started_at,
            finished_at: Utc::now(),
            cancelled,
        })
    }
}

/// State shared by every task of one run
struct CrawlRun<F> {
    fetcher: Arc<F>,
    registry: VisitedRegistry,
    coalescer: RequestCoalescer,
    fetch_slots: Arc<Semaphore>,
    tracker: TaskTracker,
    cancel: CancellationToken,
    root: Url,
    timeout: Duration,
    max_pages: Option<usize>,
    started: Instant,
}

impl<F: PageFetcher> CrawlRun<F> {
    fn spawn(self: &Arc<Self>, task: CrawlTask) {
        self.tracker.spawn(Arc::clone(self).process(task));
    }

    // Boxed so that the recursive spawn in fan-out has a nameable type
    fn process(self: Arc<Self>, task: CrawlTask) -> BoxFuture<'static, ()> {
        async move {
            if self.cancel.is_cancelled() {
                return;
            }

            tracing::info!("checking {}", task.url);

            let normalized = match normalize_url(&task.url) {
                Ok(normalized) => normalized,
                Err(e) => {
                    tracing::debug!("Dropping {}: {}", task.url, e);
                    return;
                }
            };

            if let Some(max_pages) = self.max_pages {
                if self.registry.recorded_count() >= max_pages {
                    tracing::debug!("Page limit {} reached, skipping {}", max_pages, task.url);
                    return;
                }
            }

            if self.registry.claim_or_join(&normalized.key) == Claim::Joined {
                tracing::debug!("Skipping {} (already seen)", task.url);
                return;
            }

            let result = tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::debug!("Abandoning fetch of {}", task.url);
                    return;
                }
                result = self.fetch(&task.url) => result,
            };

            let (outcome, page) = match classify(result) {
                Classification::Alive(page) => {
                    (PageOutcome::alive(&task.url, &task.source_url), Some(page))
                }
                Classification::Dead { reason } => {
                    tracing::debug!("Dead link {} on {}: {}", task.url, task.source_url, reason);
                    (
                        PageOutcome::dead(&task.url, &task.source_url, Some(reason)),
                        None,
                    )
                }
                Classification::NotHtml { content_type } => {
                    tracing::debug!("{} is not HTML ({})", task.url, content_type);
                    (PageOutcome::dead(&task.url, &task.source_url, None), None)
                }
            };

            self.registry.record(&normalized.key, outcome);
            self.log_progress();

            let Some(page) = page else {
                return;
            };

            // Redirects may have moved the page to another host
            let page_url = page.final_url.unwrap_or(normalized.url);

            if !is_same_host(&self.root, &page_url) {
                tracing::debug!("Not following links on off-host page {} ({})", task.url, page_url);
                return;
            }

            let links = extract_links(&page.body, &page_url);
            tracing::debug!("Found {} links on {}", links.len(), task.url);

            for link in links {
                self.spawn(CrawlTask::new(link, task.url.clone()));
            }
        }
        .boxed()
    }

    /// Fetches through the coalescer; the fetch budget is held by the
    /// shared fetch only, never by the tasks waiting on it
    async fn fetch(&self, url: &str) -> FetchResult {
        let fetcher = Arc::clone(&self.fetcher);
        let slots = Arc::clone(&self.fetch_slots);
        let cancel = self.cancel.clone();
        let timeout = self.timeout;
        let owned_url = url.to_string();

        self.coalescer
            .coalesce(url, move || async move {
                // Own task: a waiter that stops waiting leaves the fetch running
                let handle = tokio::spawn(fetch_with_slot(fetcher, slots, cancel, owned_url, timeout));
                match handle.await {
                    Ok(result) => result,
                    Err(e) => Err(FetchError::Aborted(e.to_string())),
                }
            })
            .await
    }

    fn log_progress(&self) {
        let recorded = self.registry.recorded_count();
        if recorded % PROGRESS_INTERVAL == 0 {
            let elapsed = self.started.elapsed();
            tracing::info!(
                "Progress: {} pages checked, {} tasks running, {:.2} pages/sec",
                recorded,
                self.tracker.len(),
                recorded as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
            );
        }
    }
}

async fn fetch_with_slot<F: PageFetcher>(
    fetcher: Arc<F>,
    slots: Arc<Semaphore>,
    cancel: CancellationToken,
    url: String,
    timeout: Duration,
) -> FetchResult {
    let permit = tokio::select! {
        _ = cancel.cancelled() => None,
        permit = slots.acquire_owned() => permit.ok(),
    };

    let Some(_permit) = permit else {
        return Err(FetchError::Aborted(format!("no fetch slot for {}", url)));
    };

    fetcher.fetch(&url, timeout).await
}
