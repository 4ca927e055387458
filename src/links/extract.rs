//! Per-page link extraction and classification

use super::{link_type, patterns, LinkPolicy, LinkReference, LinkType, MAX_TEXT_CHARS, NO_TEXT};
use crate::crawler::parser::{Anchor, ParsedDocument};
use crate::url::{canonicalize, CanonicalUrl, CrawlScope};
use percent_encoding::percent_decode_str;
use std::collections::HashSet;
use url::Url;

/// Href prefixes that never point at a fetchable page
const IGNORED_PREFIXES: &[&str] = &["#", "javascript:", "mailto:", "tel:", "data:", "blob:"];

/// A target URL discovered on a page, ready for frontier admission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Absolute URL to fetch (fragment removed)
    pub url: String,

    pub canonical: CanonicalUrl,

    pub link_type: LinkType,
}

/// Result of classifying one page's anchors
#[derive(Debug, Clone, Default)]
pub struct ClassifiedLinks {
    /// Internal targets eligible for crawling (skip patterns already removed)
    pub crawl_candidates: Vec<Candidate>,

    /// Every target whose liveness must be verified
    pub check_candidates: Vec<Candidate>,

    /// Ordered link references kept for the report
    pub references: Vec<LinkReference>,
}

/// Classifies the anchors of a parsed page
///
/// # Arguments
///
/// * `doc` - The parsed page
/// * `page_url` - The URL the page was served from (after redirects), used to resolve hrefs
/// * `scope` - The crawl scope deciding internal vs external
/// * `policy` - External checking and content-area filtering switches
///
/// # Returns
///
/// Crawl candidates, check candidates and link references, each in document order.
/// Within one page, a target (canonical URL plus fragment) is recorded once and keeps
/// the text of its first occurrence.
pub fn classify_page(
    doc: &ParsedDocument,
    page_url: &Url,
    scope: &CrawlScope,
    policy: &LinkPolicy,
) -> ClassifiedLinks {
    let mut classified = ClassifiedLinks::default();
    let mut seen_references: HashSet<(CanonicalUrl, Option<String>)> = HashSet::new();
    let mut seen_crawl: HashSet<CanonicalUrl> = HashSet::new();
    let mut seen_check: HashSet<CanonicalUrl> = HashSet::new();

    for anchor in &doc.anchors {
        if policy.content_only && anchor.in_boilerplate {
            tracing::trace!("Dropping boilerplate link {}", anchor.href);
            continue;
        }

        let Some(reference) = build_reference(anchor, page_url, scope) else {
            continue;
        };

        if !policy.checks(reference.link_type) {
            tracing::trace!(
                "Not checking {} link {}",
                reference.link_type,
                reference.canonical
            );
            continue;
        }

        let key = (reference.canonical.clone(), reference.fragment.clone());
        if !seen_references.insert(key) {
            continue;
        }

        let candidate = Candidate {
            url: strip_fragment(&reference.url),
            canonical: reference.canonical.clone(),
            link_type: reference.link_type,
        };

        if seen_check.insert(candidate.canonical.clone()) {
            classified.check_candidates.push(candidate.clone());
        }

        if candidate.link_type == LinkType::Internal {
            if patterns::is_skipped(&candidate.canonical) {
                tracing::trace!("Skip pattern matched {}", candidate.canonical);
            } else if seen_crawl.insert(candidate.canonical.clone()) {
                classified.crawl_candidates.push(candidate);
            }
        }

        classified.references.push(reference);
    }

    classified
}

fn build_reference(anchor: &Anchor, page_url: &Url, scope: &CrawlScope) -> Option<LinkReference> {
    let href = anchor.href.trim();
    if href.is_empty() || is_ignored_href(href) {
        return None;
    }

    // Malformed hrefs are expected in real markup
    let resolved = page_url.join(href).ok()?;
    let canonical = canonicalize(resolved.as_str(), false).ok()?;
    // Ids are compared as written in the markup, so undo the URL escaping
    let fragment = resolved
        .fragment()
        .filter(|f| !f.is_empty())
        .map(|f| percent_decode_str(f).decode_utf8_lossy().into_owned());

    Some(LinkReference {
        href: anchor.href.clone(),
        url: resolved.to_string(),
        link_type: link_type(&canonical, scope),
        canonical,
        text: link_text(anchor),
        is_image: anchor.has_image,
        fragment,
    })
}

fn is_ignored_href(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    IGNORED_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

fn link_text(anchor: &Anchor) -> String {
    let text = if !anchor.text.is_empty() {
        anchor.text.as_str()
    } else if let Some(alt) = anchor.image_alt.as_deref() {
        alt
    } else {
        NO_TEXT
    };

    text.chars().take(MAX_TEXT_CHARS).collect()
}

fn strip_fragment(url: &str) -> String {
    match url.split_once('#') {
        Some((before, _)) => before.to_string(),
        None => url.to_string(),
    }
}
