//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML parsing into a document snapshot
//! - The crawl frontier with atomic admission
//! - Overall crawl coordination

mod coordinator;
pub mod fetcher;
pub mod frontier;
pub mod parser;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, FetchOutcome, Fetcher, HttpFetcher};
pub use frontier::{EntryKind, Frontier, FrontierEntry};
pub use parser::{parse_html, Anchor, ParsedDocument};

use crate::config::Config;
use crate::resolver::CrawlReport;
use crate::Result;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP fetcher from the configuration
/// 2. Seed the frontier with the base URL
/// 3. Fetch pages and admit their links until the frontier drains
/// 4. Resolve the observations into a report
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed (the report may still list broken links)
/// * `Err(LinkrotError)` - The base URL is invalid or the HTTP client cannot be built
pub async fn run_crawl(config: &Config) -> Result<CrawlReport> {
    let fetcher = HttpFetcher::from_config(config)?;
    let coordinator = Coordinator::new(&config.crawler, Arc::new(fetcher))?;
    Ok(coordinator.run_and_resolve().await)
}
