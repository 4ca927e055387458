//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - Redirect following with a hop limit
//! - Retry of transport failures through the [`FetchState`] machine
//! - Error descriptions carrying the full source chain

use crate::config::{Config, UserAgentConfig};
use crate::crawler::parser::{parse_html, ParsedDocument};
use crate::state::FetchState;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::error::Error as StdError;
use std::time::Duration;

/// Maximum number of redirect hops followed per request
pub const MAX_REDIRECTS: usize = 10;

/// Default pause before the first retry; later retries wait proportionally longer
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Content types parsed into a document
const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Terminal outcome of fetching one URL
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    /// URL after redirects (`None` when no response was received)
    pub final_url: Option<String>,

    /// HTTP status code of the final response
    pub status: Option<u16>,

    /// Transport error description, when no response was received
    pub error: Option<String>,

    /// Parsed page, for HTML responses only
    pub document: Option<ParsedDocument>,
}

impl FetchOutcome {
    /// Outcome for a received response
    pub fn response(
        final_url: impl Into<String>,
        status: u16,
        document: Option<ParsedDocument>,
    ) -> Self {
        Self {
            final_url: Some(final_url.into()),
            status: Some(status),
            error: None,
            document,
        }
    }

    /// Outcome for a request that never produced a response
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.status.is_some_and(|s| (200..300).contains(&s))
    }
}

/// Transport collaborator used by the crawl coordinator
///
/// Implementations must terminate and return exactly one outcome per call; retries and
/// backoff are their own concern.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// Formats the user agent string: `Name/Version (+ContactURL)`
pub fn user_agent(config: &UserAgentConfig) -> String {
    match &config.contact_url {
        Some(contact) => format!(
            "{}/{} (+{})",
            config.crawler_name, config.crawler_version, contact
        ),
        None => format!("{}/{}", config.crawler_name, config.crawler_version),
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Whole-request timeout
///
/// # Example
///
/// ```no_run
/// use linkrot::config::UserAgentConfig;
/// use linkrot::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "linkrot".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: Some("https://example.com/about".to_string()),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent(config))
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed [`Fetcher`]
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Any HTTP response (2xx to 5xx) | Terminal, no retry |
/// | Timeout | Retry up to `max_retries` times |
/// | Connection / DNS failure | Retry up to `max_retries` times |
/// | Redirect limit exceeded | Retry up to `max_retries` times, then failure |
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpFetcher {
    pub fn new(client: Client, max_retries: u32) -> Self {
        Self {
            client,
            max_retries,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Builds a fetcher from the crawler and user agent sections of the config
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent, config.crawler.request_timeout())?;
        Ok(Self::new(client, config.crawler.max_retries))
    }

    /// Overrides the base delay between retries
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    async fn attempt(&self, url: &str) -> Result<FetchOutcome, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if !HTML_CONTENT_TYPES.iter().any(|ct| content_type.contains(ct)) {
            return Ok(FetchOutcome::response(final_url, status, None));
        }

        // A response was received, so a failed body read keeps the status
        let document = match response.text().await {
            Ok(body) => Some(parse_html(&body)),
            Err(e) => {
                tracing::warn!("Failed to read body of {}: {}", final_url, describe_error(&e));
                None
            }
        };

        Ok(FetchOutcome::response(final_url, status, document))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let mut state = FetchState::Pending;

        loop {
            state = state.start();

            match self.attempt(url).await {
                Ok(outcome) => {
                    state = state.on_response();
                    tracing::debug!(
                        "Fetched {} -> {:?} after {} attempt(s)",
                        url,
                        outcome.status,
                        state.attempts()
                    );
                    return outcome;
                }
                Err(e) => {
                    state = state.on_transport_error(describe_error(&e), self.max_retries);
                }
            }

            match &state {
                FetchState::Retrying {
                    attempt,
                    last_error,
                } => {
                    tracing::warn!(
                        "Attempt {} for {} failed: {}; retrying",
                        attempt,
                        url,
                        last_error
                    );
                    tokio::time::sleep(self.retry_delay * *attempt).await;
                }
                FetchState::PermanentlyFailed { attempts, error } => {
                    tracing::debug!("Giving up on {} after {} attempt(s)", url, attempts);
                    return FetchOutcome::failure(error.clone());
                }
                other => {
                    return FetchOutcome::failure(format!("Unexpected fetch state: {}", other));
                }
            }
        }
    }
}

/// Describes a request error with its category and full source chain
///
/// The chain matters: reqwest's top-level message is generic, while the causes carry
/// signatures such as `operation timed out`, `dns error` or `Connection refused`.
pub fn describe_error(error: &reqwest::Error) -> String {
    let category = if error.is_timeout() {
        "Request timed out"
    } else if error.is_connect() {
        "Connection failed"
    } else if error.is_redirect() {
        "Too many redirects"
    } else {
        "Request failed"
    };

    let mut message = format!("{}: {}", category, error);
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
