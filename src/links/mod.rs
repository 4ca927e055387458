//! Link classification for linkrot
//!
//! This module turns the anchors of a parsed page into typed link references and decides
//! which targets are crawled and which are only checked for liveness.

mod extract;
pub mod patterns;

pub use extract::{classify_page, Candidate, ClassifiedLinks};

use crate::url::{CanonicalUrl, CrawlScope};
use serde::Serialize;

/// Placeholder text for anchors without visible text or image alt
pub const NO_TEXT: &str = "[no text]";

/// Maximum number of characters kept from an anchor's text
pub const MAX_TEXT_CHARS: usize = 100;

/// Type of a link target relative to the crawled site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Page on the crawled site (base host, or any subdomain when enabled)
    Internal,
    /// Page on another site
    External,
    /// Non-HTML file, regardless of host
    Resource,
    /// Host could not be determined
    Unknown,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Internal => "internal",
            LinkType::External => "external",
            LinkType::Resource => "resource",
            LinkType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for LinkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One anchor occurrence on a page, prior to resolution against crawl results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkReference {
    /// The `href` attribute as written in the page
    pub href: String,

    /// Absolute URL after resolution against the page URL (fragment included)
    pub url: String,

    /// Canonical target, without fragment
    pub canonical: CanonicalUrl,

    /// Link text (collapsed, truncated, image alt or placeholder fallback)
    pub text: String,

    pub link_type: LinkType,

    /// True if the anchor wraps an image
    pub is_image: bool,

    /// Fragment identifier the link points at, if any
    pub fragment: Option<String>,
}

/// Which discovered links are kept and checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkPolicy {
    /// Check external links for liveness
    pub check_external: bool,

    /// Drop anchors located inside navigation, footer, sidebar and similar containers
    pub content_only: bool,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self {
            check_external: true,
            content_only: false,
        }
    }
}

impl LinkPolicy {
    /// Returns true if links of this type are checked (and therefore reported)
    pub fn checks(&self, link_type: LinkType) -> bool {
        match link_type {
            LinkType::Internal | LinkType::Resource => true,
            LinkType::External => self.check_external,
            LinkType::Unknown => false,
        }
    }
}

/// Derives the type of a canonical link target
///
/// Precedence: resource extension first (any host), then host outside the crawl scope
/// (external), otherwise internal. A target without a host is `Unknown`.
pub fn link_type(target: &CanonicalUrl, scope: &CrawlScope) -> LinkType {
    if patterns::is_resource(target) {
        return LinkType::Resource;
    }

    match target.host() {
        None => LinkType::Unknown,
        Some(host) if scope.contains_host(&host) => LinkType::Internal,
        Some(_) => LinkType::External,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::canonicalize;

    fn target(raw: &str) -> CanonicalUrl {
        canonicalize(raw, false).unwrap()
    }

    #[test]
    fn test_link_type_precedence() {
        let scope = CrawlScope::new("https://example.com", false).unwrap();

        assert_eq!(link_type(&target("https://example.com/about"), &scope), LinkType::Internal);
        assert_eq!(link_type(&target("https://www.example.com/"), &scope), LinkType::Internal);
        assert_eq!(link_type(&target("https://other.org/page"), &scope), LinkType::External);
        assert_eq!(link_type(&target("https://example.com/a.pdf"), &scope), LinkType::Resource);
        assert_eq!(link_type(&target("https://cdn.net/a.PNG"), &scope), LinkType::Resource);
        assert_eq!(link_type(&target("https://blog.example.com/"), &scope), LinkType::External);
    }

    #[test]
    fn test_link_type_with_subdomains() {
        let scope = CrawlScope::new("https://example.com", true).unwrap();
        assert_eq!(link_type(&target("https://blog.example.com/"), &scope), LinkType::Internal);
        assert_eq!(link_type(&target("https://example.org/"), &scope), LinkType::External);
    }

    #[test]
    fn test_policy_checks() {
        let policy = LinkPolicy::default();
        assert!(policy.checks(LinkType::Internal));
        assert!(policy.checks(LinkType::External));
        assert!(policy.checks(LinkType::Resource));
        assert!(!policy.checks(LinkType::Unknown));

        let internal_only = LinkPolicy {
            check_external: false,
            content_only: false,
        };
        assert!(!internal_only.checks(LinkType::External));
        assert!(internal_only.checks(LinkType::Resource));
    }

    #[test]
    fn test_link_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LinkType::Resource).unwrap(), "\"resource\"");
        assert_eq!(LinkType::External.to_string(), "external");
    }
}
