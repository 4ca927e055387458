//! Link status classification
//!
//! Maps a target's HTTP status or transport error message to a status bucket, an issue
//! type and a severity. The signature tables are matched case-insensitively as
//! substrings, in table order.

use serde::Serialize;
use std::fmt;

/// Error message signatures of timeouts
const TIMEOUT_SIGNATURES: &[&str] = &["timeout", "timed out", "err_timed_out"];

/// Error message signatures of DNS failures and refused connections
const CONNECTION_FAILED_SIGNATURES: &[&str] = &[
    "err_name_not_resolved",
    "enotfound",
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "no such host",
    "econnrefused",
    "connection refused",
    "err_connection_refused",
];

/// Error message signatures of reset connections
const CONNECTION_RESET_SIGNATURES: &[&str] =
    &["econnreset", "connection reset", "err_connection_reset"];

/// Status bucket of a resolved link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LinkStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "Redirect")]
    Redirect,
    #[serde(rename = "Not Found")]
    NotFound,
    #[serde(rename = "Forbidden")]
    Forbidden,
    #[serde(rename = "Unauthorized")]
    Unauthorized,
    #[serde(rename = "Client Error")]
    ClientError,
    #[serde(rename = "Server Error")]
    ServerError,
    #[serde(rename = "Timeout")]
    Timeout,
    #[serde(rename = "Connection Failed")]
    ConnectionFailed,
    #[serde(rename = "Connection Reset")]
    ConnectionReset,
    #[serde(rename = "Error")]
    Error,
    #[serde(rename = "Unknown")]
    Unknown,
    #[serde(rename = "Missing Fragment")]
    MissingFragment,
    #[serde(rename = "Uncrawled")]
    Uncrawled,
}

impl LinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Redirect => "Redirect",
            Self::NotFound => "Not Found",
            Self::Forbidden => "Forbidden",
            Self::Unauthorized => "Unauthorized",
            Self::ClientError => "Client Error",
            Self::ServerError => "Server Error",
            Self::Timeout => "Timeout",
            Self::ConnectionFailed => "Connection Failed",
            Self::ConnectionReset => "Connection Reset",
            Self::Error => "Error",
            Self::Unknown => "Unknown",
            Self::MissingFragment => "Missing Fragment",
            Self::Uncrawled => "Uncrawled",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed issue type derived from the status bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum IssueType {
    #[serde(rename = "404_not_found")]
    NotFound,
    #[serde(rename = "403_forbidden")]
    Forbidden,
    #[serde(rename = "401_unauthorized")]
    Unauthorized,
    #[serde(rename = "4xx_client_error")]
    ClientError,
    #[serde(rename = "5xx_server_error")]
    ServerError,
    #[serde(rename = "timeout")]
    Timeout,
    #[serde(rename = "dns_or_connection_failure")]
    ConnectionFailure,
    #[serde(rename = "connection_reset")]
    ConnectionReset,
    #[serde(rename = "network_error")]
    NetworkError,
    #[serde(rename = "no_response")]
    NoResponse,
    #[serde(rename = "redirect")]
    Redirect,
    #[serde(rename = "missing_fragment")]
    MissingFragment,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "404_not_found",
            Self::Forbidden => "403_forbidden",
            Self::Unauthorized => "401_unauthorized",
            Self::ClientError => "4xx_client_error",
            Self::ServerError => "5xx_server_error",
            Self::Timeout => "timeout",
            Self::ConnectionFailure => "dns_or_connection_failure",
            Self::ConnectionReset => "connection_reset",
            Self::NetworkError => "network_error",
            Self::NoResponse => "no_response",
            Self::Redirect => "redirect",
            Self::MissingFragment => "missing_fragment",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of an issue, ordered from `Low` to `High`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived classification of one link target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub status: LinkStatus,
    pub issue_type: Option<IssueType>,
    pub severity: Option<Severity>,
    pub is_broken: bool,
}

impl Classification {
    const fn new(
        status: LinkStatus,
        issue_type: Option<IssueType>,
        severity: Option<Severity>,
        is_broken: bool,
    ) -> Self {
        Self {
            status,
            issue_type,
            severity,
            is_broken,
        }
    }

    const fn broken(status: LinkStatus, issue_type: IssueType, severity: Severity) -> Self {
        Self::new(status, Some(issue_type), Some(severity), true)
    }

    const OK: Self = Self::new(LinkStatus::Ok, None, None, false);
    const REDIRECT: Self = Self::new(
        LinkStatus::Redirect,
        Some(IssueType::Redirect),
        Some(Severity::Low),
        false,
    );
    const UNCRAWLED: Self = Self::new(LinkStatus::Uncrawled, None, None, false);
}

/// Classifies a fetched target from its HTTP status and error message
///
/// An error message takes precedence over the status. A 3xx response is reported as
/// `Redirect` but is never broken; `304 Not Modified` counts as OK.
///
/// # Examples
///
/// ```
/// use linkrot::resolver::status::{classify, IssueType, LinkStatus, Severity};
///
/// let c = classify(Some(404), None);
/// assert_eq!(c.status, LinkStatus::NotFound);
/// assert_eq!(c.issue_type, Some(IssueType::NotFound));
/// assert_eq!(c.severity, Some(Severity::High));
/// assert!(c.is_broken);
///
/// let c = classify(None, Some("Error: Navigation timed out"));
/// assert_eq!(c.status, LinkStatus::Timeout);
/// ```
pub fn classify(status: Option<u16>, error: Option<&str>) -> Classification {
    if let Some(error) = error.filter(|e| !e.trim().is_empty()) {
        return classify_error(error);
    }

    match status {
        Some(200..=299) | Some(304) => Classification::OK,
        Some(300..=399) => Classification::REDIRECT,
        Some(404) => Classification::broken(LinkStatus::NotFound, IssueType::NotFound, Severity::High),
        Some(403) => {
            Classification::broken(LinkStatus::Forbidden, IssueType::Forbidden, Severity::Medium)
        }
        Some(401) => Classification::broken(
            LinkStatus::Unauthorized,
            IssueType::Unauthorized,
            Severity::Medium,
        ),
        Some(400..=499) => Classification::broken(
            LinkStatus::ClientError,
            IssueType::ClientError,
            Severity::Medium,
        ),
        Some(500) => {
            Classification::broken(LinkStatus::ServerError, IssueType::ServerError, Severity::High)
        }
        Some(500..=599) => Classification::broken(
            LinkStatus::ServerError,
            IssueType::ServerError,
            Severity::Medium,
        ),
        _ => Classification::broken(LinkStatus::Unknown, IssueType::NoResponse, Severity::Medium),
    }
}

fn classify_error(error: &str) -> Classification {
    let lower = error.to_lowercase();
    let matches = |signatures: &[&str]| signatures.iter().any(|sig| lower.contains(sig));

    if matches(TIMEOUT_SIGNATURES) {
        Classification::broken(LinkStatus::Timeout, IssueType::Timeout, Severity::High)
    } else if matches(CONNECTION_FAILED_SIGNATURES) {
        Classification::broken(
            LinkStatus::ConnectionFailed,
            IssueType::ConnectionFailure,
            Severity::High,
        )
    } else if matches(CONNECTION_RESET_SIGNATURES) {
        Classification::broken(
            LinkStatus::ConnectionReset,
            IssueType::ConnectionReset,
            Severity::Medium,
        )
    } else {
        Classification::broken(LinkStatus::Error, IssueType::NetworkError, Severity::Medium)
    }
}

/// Classifies one resolved link
///
/// * an uncrawled target is `Uncrawled` and never broken
/// * a crawled target is classified from its status and error
/// * a clean target whose fragment is missing is broken with `Missing Fragment`
pub fn assess(
    crawled: bool,
    status: Option<u16>,
    error: Option<&str>,
    fragment_valid: bool,
) -> Classification {
    if !crawled {
        return Classification::UNCRAWLED;
    }

    let classification = classify(status, error);
    if !classification.is_broken && !fragment_valid {
        return Classification::broken(
            LinkStatus::MissingFragment,
            IssueType::MissingFragment,
            Severity::Low,
        );
    }

    classification
}
