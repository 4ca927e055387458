//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the driving loop of a crawl:
//! - Seeding the frontier with the base URL
//! - Dispatching frontier entries to a bounded pool of workers
//! - Fetching, classifying and admitting discovered links per entry
//! - Recording one observation per dispatched entry
//!
//! The loop ends when the frontier is drained (or its page budget is spent) and no
//! worker is in flight. Only then is the observation store snapshotted for resolution.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::crawler::frontier::{EntryKind, Frontier, FrontierEntry};
use crate::links::{classify_page, patterns, LinkPolicy, LinkType};
use crate::resolver::{resolve, CrawlReport};
use crate::storage::{ObservationStore, PageObservation, PageOutcome};
use crate::url::{canonicalize, CrawlScope};
use crate::{LinkrotError, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use url::Url;

/// State shared by every worker of one crawl
struct WorkerContext {
    policy: LinkPolicy,
    fetcher: Arc<dyn Fetcher>,
    frontier: Frontier,
    store: ObservationStore,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    ctx: Arc<WorkerContext>,
    max_concurrency: usize,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fetcher` - Transport used for every request
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(LinkrotError::InvalidBaseUrl)` - The base URL cannot be canonicalized
    pub fn new(config: &CrawlerConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        let scope = CrawlScope::new(&config.base_url, config.crawl_subdomains).map_err(|e| {
            LinkrotError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: e.to_string(),
            }
        })?;

        let frontier = Frontier::new(scope, config.max_depth, config.max_pages);

        Ok(Self {
            ctx: Arc::new(WorkerContext {
                policy: config.link_policy(),
                fetcher,
                frontier,
                store: ObservationStore::new(),
            }),
            max_concurrency: config.max_concurrency.max(1),
        })
    }

    pub fn scope(&self) -> &CrawlScope {
        self.ctx.frontier.scope()
    }

    /// Runs the crawl until the frontier drains
    ///
    /// Returns a snapshot of every observation recorded, in completion order.
    pub async fn run(&self) -> Vec<PageObservation> {
        let frontier = &self.ctx.frontier;
        tracing::info!(
            "Starting crawl of {} (max {} pages, depth {}, {} workers)",
            frontier.scope().base(),
            frontier.max_pages(),
            frontier.max_depth(),
            self.max_concurrency
        );

        frontier.seed();

        let start_time = Instant::now();
        let mut workers: JoinSet<()> = JoinSet::new();
        let mut completed: usize = 0;

        loop {
            while workers.len() < self.max_concurrency {
                let Some(entry) = frontier.next_entry() else {
                    break;
                };
                workers.spawn(run_entry(Arc::clone(&self.ctx), entry));
            }

            match workers.join_next().await {
                Some(Ok(())) => {
                    completed += 1;
                    if completed % 10 == 0 {
                        let rate = completed as f64 / start_time.elapsed().as_secs_f64();
                        tracing::info!(
                            "Progress: {} pages fetched, {} in frontier, {:.2} pages/sec",
                            completed,
                            frontier.queued(),
                            rate
                        );
                    }
                }
                Some(Err(e)) => tracing::warn!("Worker task ended abnormally: {}", e),
                None => break,
            }
        }

        if frontier.budget_exhausted() && frontier.queued() > 0 {
            tracing::info!(
                "Page budget reached with {} URLs left in frontier",
                frontier.queued()
            );
        }

        let observations = self.ctx.store.snapshot();
        tracing::info!(
            "Crawl completed: {} observations in {:?}",
            observations.len(),
            start_time.elapsed()
        );
        observations
    }

    /// Runs the crawl and resolves its observations into a report
    pub async fn run_and_resolve(&self) -> CrawlReport {
        let observations = self.run().await;
        resolve(self.scope().base(), &observations)
    }
}

/// Processes one entry on its own task so a panic still leaves an observation behind
async fn run_entry(ctx: Arc<WorkerContext>, entry: FrontierEntry) {
    let task_ctx = Arc::clone(&ctx);
    let task_entry = entry.clone();
    let joined = tokio::spawn(async move { process_entry(&task_ctx, task_entry).await }).await;

    let observation = match joined {
        Ok(observation) => observation,
        Err(e) => {
            tracing::warn!("Processing {} failed: {}", entry.url, e);
            let error = LinkrotError::TaskFailed(e.to_string());
            observation_for(&ctx, &entry, PageOutcome::failed(error.to_string()))
        }
    };

    ctx.frontier.mark_observed(&observation.url);
    ctx.store.append(observation);
}

/// Fetches one entry, admits its discovered links and builds its observation
async fn process_entry(ctx: &WorkerContext, entry: FrontierEntry) -> PageObservation {
    tracing::debug!(
        "Fetching {} (depth {}, {})",
        entry.requested_url,
        entry.depth,
        entry.kind.as_str()
    );

    let fetched = ctx.fetcher.fetch(&entry.requested_url).await;
    let outcome = match extraction_base(ctx, &entry, &fetched) {
        Some(page_url) => extract(ctx, &entry, fetched, &page_url),
        None => leaf_outcome(fetched),
    };

    observation_for(ctx, &entry, outcome)
}

/// URL to resolve links against, if this fetch qualifies for link extraction
///
/// Only crawl entries answering 2xx with an HTML document whose final URL is still in
/// scope are extracted.
fn extraction_base(
    ctx: &WorkerContext,
    entry: &FrontierEntry,
    fetched: &FetchOutcome,
) -> Option<Url> {
    if entry.kind != EntryKind::Crawl || !fetched.is_success() || fetched.document.is_none() {
        return None;
    }

    let final_url = fetched.final_url.as_deref().unwrap_or(&entry.requested_url);
    let page_url = Url::parse(final_url).ok()?;
    let canonical = canonicalize(page_url.as_str(), false).ok()?;

    if !ctx.frontier.scope().contains(&canonical) {
        tracing::debug!("{} redirected out of scope to {}", entry.url, canonical);
        return None;
    }
    Some(page_url)
}

fn extract(
    ctx: &WorkerContext,
    entry: &FrontierEntry,
    fetched: FetchOutcome,
    page_url: &Url,
) -> PageOutcome {
    let document = fetched.document.unwrap_or_default();
    let classified = classify_page(&document, page_url, ctx.frontier.scope(), &ctx.policy);

    let child_depth = if patterns::is_archive(&entry.url) {
        entry.depth
    } else {
        entry.depth + 1
    };

    let mut admitted = 0;
    for candidate in &classified.crawl_candidates {
        if ctx
            .frontier
            .admit(&candidate.url, child_depth, Some(&entry.url), EntryKind::Crawl)
        {
            admitted += 1;
        }
    }
    // Internal pages are already queued as crawl entries unless a skip pattern kept them out
    for candidate in classified.check_candidates.iter().filter(|candidate| {
        candidate.link_type != LinkType::Internal || patterns::is_skipped(&candidate.canonical)
    }) {
        if ctx
            .frontier
            .admit(&candidate.url, child_depth, Some(&entry.url), EntryKind::Check)
        {
            admitted += 1;
        }
    }

    tracing::debug!(
        "{}: {} links, {} newly admitted",
        entry.url,
        classified.references.len(),
        admitted
    );

    PageOutcome::Extracted {
        status: fetched.status.unwrap_or(200),
        title: document.title,
        fragments: document.fragment_ids,
        links: classified.references,
    }
}

fn leaf_outcome(fetched: FetchOutcome) -> PageOutcome {
    let (title, fragments) = match fetched.document {
        Some(document) => (document.title, document.fragment_ids),
        None => (None, Default::default()),
    };

    PageOutcome::NotExtracted {
        status: fetched.status,
        error: fetched.error,
        title,
        fragments,
    }
}

fn observation_for(
    ctx: &WorkerContext,
    entry: &FrontierEntry,
    outcome: PageOutcome,
) -> PageObservation {
    PageObservation {
        is_base: &entry.url == ctx.frontier.scope().base(),
        url: entry.url.clone(),
        requested_url: entry.requested_url.clone(),
        depth: entry.depth,
        referrer: entry.referrer.clone(),
        outcome,
    }
}
