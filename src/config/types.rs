use crate::links::LinkPolicy;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for linkrot
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL the crawl starts from
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum number of URLs fetched in one run
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Maximum depth to crawl from the base URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of concurrent fetches
    #[serde(rename = "max-concurrency")]
    pub max_concurrency: usize,

    /// Treat every subdomain of the base domain's registrable root as internal
    #[serde(rename = "crawl-subdomains", default)]
    pub crawl_subdomains: bool,

    /// Check external links for liveness
    #[serde(rename = "check-external-links", default = "default_true")]
    pub check_external_links: bool,

    /// Ignore links inside navigation, footer, sidebar and similar containers
    #[serde(rename = "content-links-only", default)]
    pub content_links_only: bool,

    /// Whole-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retries after a transport failure (HTTP responses are never retried)
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,
}

impl CrawlerConfig {
    pub fn link_policy(&self) -> LinkPolicy {
        LinkPolicy {
            check_external: self.check_external_links,
            content_only: self.content_links_only,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSON report file
    #[serde(rename = "report-path")]
    pub report_path: String,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: String,

    /// Path to the SQLite database file (no database when absent)
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,

    /// Persist only broken links
    #[serde(rename = "save-only-broken-links", default)]
    pub save_only_broken_links: bool,
}

/// Notification configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifyConfig {
    /// Webhook URLs receiving the broken-link notification
    #[serde(default)]
    pub destinations: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}
