//! linkrot: a broken-link crawler
//!
//! This crate crawls a website from a base URL, records every outbound link found on
//! every visited page, and resolves the collected observations into a report of
//! broken and working links (HTTP errors, timeouts, network failures and missing
//! fragment targets).

pub mod config;
pub mod crawler;
pub mod links;
pub mod output;
pub mod resolver;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for linkrot operations
#[derive(Debug, Error)]
pub enum LinkrotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Crawl task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Empty URL")]
    Empty,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Errors raised by report sinks and notifiers
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Notification delivery failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to format output: {0}")]
    Format(String),
}

/// Result type alias for linkrot operations
pub type Result<T> = std::result::Result<T, LinkrotError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for output operations
pub type OutputResult<T> = std::result::Result<T, OutputError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator};
pub use resolver::{resolve, CrawlReport, LinkEdge, ResultPage};
pub use storage::{ObservationStore, PageObservation, PageOutcome};
pub use self::url::{canonicalize, CanonicalUrl, CrawlScope};
