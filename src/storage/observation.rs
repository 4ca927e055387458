//! Page observation records

use crate::links::LinkReference;
use crate::url::CanonicalUrl;
use std::collections::HashSet;

/// What a fetch produced for one page
///
/// Only pages whose links were extracted carry link references; every other outcome
/// (external leaf, resource, HTTP error, transport failure, non-HTML body) is
/// `NotExtracted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// An internal HTML page whose anchors were classified
    Extracted {
        status: u16,
        title: Option<String>,
        fragments: HashSet<String>,
        links: Vec<LinkReference>,
    },

    /// Any page whose links were not extracted
    NotExtracted {
        status: Option<u16>,
        error: Option<String>,
        title: Option<String>,
        fragments: HashSet<String>,
    },
}

impl PageOutcome {
    /// Outcome of a fetch that produced no response
    pub fn failed(error: impl Into<String>) -> Self {
        Self::NotExtracted {
            status: None,
            error: Some(error.into()),
            title: None,
            fragments: HashSet::new(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Extracted { status, .. } => Some(*status),
            Self::NotExtracted { status, .. } => *status,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Extracted { .. } => None,
            Self::NotExtracted { error, .. } => error.as_deref(),
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Extracted { title, .. } | Self::NotExtracted { title, .. } => title.as_deref(),
        }
    }

    /// Addressable fragment identifiers (`id` attributes and `<a name>` targets)
    pub fn fragments(&self) -> &HashSet<String> {
        match self {
            Self::Extracted { fragments, .. } | Self::NotExtracted { fragments, .. } => fragments,
        }
    }

    /// Outbound links, empty unless the page was extracted
    pub fn links(&self) -> &[LinkReference] {
        match self {
            Self::Extracted { links, .. } => links,
            Self::NotExtracted { .. } => &[],
        }
    }

    pub fn is_extracted(&self) -> bool {
        matches!(self, Self::Extracted { .. })
    }
}

/// One crawl attempt's result, immutable once created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageObservation {
    /// Canonical URL of the page
    pub url: CanonicalUrl,

    /// The URL actually requested
    pub requested_url: String,

    /// True for the seed page
    pub is_base: bool,

    /// Depth at which the page was first discovered
    pub depth: u32,

    /// Canonical URL of the page that led here
    pub referrer: Option<CanonicalUrl>,

    pub outcome: PageOutcome,
}

impl PageObservation {
    pub fn status(&self) -> Option<u16> {
        self.outcome.status()
    }

    pub fn error(&self) -> Option<&str> {
        self.outcome.error()
    }

    pub fn title(&self) -> Option<&str> {
        self.outcome.title()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::canonicalize;

    #[test]
    fn test_failed_outcome() {
        let outcome = PageOutcome::failed("Request timed out");
        assert_eq!(outcome.status(), None);
        assert_eq!(outcome.error(), Some("Request timed out"));
        assert!(outcome.links().is_empty());
        assert!(outcome.fragments().is_empty());
        assert!(!outcome.is_extracted());
    }

    #[test]
    fn test_extracted_accessors() {
        let outcome = PageOutcome::Extracted {
            status: 200,
            title: Some("Home".to_string()),
            fragments: HashSet::from(["top".to_string()]),
            links: Vec::new(),
        };
        assert_eq!(outcome.status(), Some(200));
        assert_eq!(outcome.error(), None);
        assert_eq!(outcome.title(), Some("Home"));
        assert!(outcome.fragments().contains("top"));
        assert!(outcome.is_extracted());
    }

    #[test]
    fn test_observation_delegates() {
        let observation = PageObservation {
            url: canonicalize("https://example.com/a", false).unwrap(),
            requested_url: "https://example.com/a/".to_string(),
            is_base: false,
            depth: 1,
            referrer: None,
            outcome: PageOutcome::NotExtracted {
                status: Some(404),
                error: None,
                title: Some("Not Found".to_string()),
                fragments: HashSet::new(),
            },
        };
        assert_eq!(observation.status(), Some(404));
        assert_eq!(observation.error(), None);
        assert_eq!(observation.title(), Some("Not Found"));
    }
}
