//! Result resolution
//!
//! After the frontier drains, the observation snapshot is replayed into a reachable,
//! classified link graph. The replay:
//! 1. builds a lookup table from canonical URL to observation (last write wins)
//! 2. walks breadth-first from the base URL over observed pages only
//! 3. resolves every outbound link reference of a visited page against the lookup table
//! 4. follows outbound targets only from the base page and from extracted pages, so
//!    external and resource leaves never contribute new pages
//!
//! Each source page resolves its own edges independently, even when several pages link
//! to the same target.

pub mod status;

use crate::links::{LinkReference, LinkType};
use crate::output::stats::ReportStatistics;
use crate::storage::PageObservation;
use crate::url::CanonicalUrl;
use chrono::{DateTime, Utc};
use serde::Serialize;
use status::{assess, IssueType, LinkStatus, Severity};
use std::collections::{HashMap, HashSet, VecDeque};

/// A link reference after resolution against the crawl results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkEdge {
    /// Canonical URL of the page containing the link
    pub source: CanonicalUrl,

    /// The `href` as written
    pub href: String,

    /// Absolute URL (fragment included)
    pub url: String,

    /// Canonical target (no fragment)
    pub target: CanonicalUrl,

    pub text: String,

    pub link_type: LinkType,

    pub is_image: bool,

    /// HTTP status of the target, when crawled
    pub http_status: Option<u16>,

    /// Transport error of the target, when crawled
    pub error: Option<String>,

    pub fragment: Option<String>,

    /// True if there is no fragment, or the crawled target exposes it
    pub fragment_valid: bool,

    /// True if the target was observed during the crawl
    pub crawled: bool,

    pub status: LinkStatus,

    pub issue_type: Option<IssueType>,

    pub severity: Option<Severity>,

    pub is_broken: bool,
}

/// One observed page in the reachable graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultPage {
    pub url: CanonicalUrl,
    pub title: Option<String>,
    pub http_status: Option<u16>,
    pub error: Option<String>,
    pub depth: u32,
    pub is_base: bool,
    /// Resolved outbound links (empty for pages whose links were not extracted)
    pub links: Vec<LinkEdge>,
}

/// Final report handed to sinks and notifiers
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub base_url: String,
    pub generated_at: DateTime<Utc>,
    pub pages: Vec<ResultPage>,
    /// Every broken edge, in page order
    pub broken: Vec<LinkEdge>,
    pub stats: ReportStatistics,
}

impl CrawlReport {
    pub fn has_broken_links(&self) -> bool {
        !self.broken.is_empty()
    }

    /// Total number of resolved edges across all pages
    pub fn edge_count(&self) -> usize {
        self.pages.iter().map(|page| page.links.len()).sum()
    }
}

/// Resolves the observation snapshot into the final report
///
/// # Arguments
///
/// * `base` - Canonical base URL the walk starts from
/// * `observations` - Every observation recorded during the crawl, in any order
///
/// A base URL without an observation produces an empty report, not an error.
pub fn resolve(base: &CanonicalUrl, observations: &[PageObservation]) -> CrawlReport {
    let lookup: HashMap<&CanonicalUrl, &PageObservation> = observations
        .iter()
        .map(|observation| (&observation.url, observation))
        .collect();

    let mut pending: VecDeque<&CanonicalUrl> = VecDeque::from([base]);
    let mut done: HashSet<&CanonicalUrl> = HashSet::new();
    let mut pages = Vec::new();

    while let Some(url) = pending.pop_front() {
        if !done.insert(url) {
            continue;
        }

        let Some(observation) = lookup.get(url).copied() else {
            tracing::debug!("No observation for {}, skipping", url);
            continue;
        };

        let references = observation.outcome.links();
        let links: Vec<LinkEdge> = references
            .iter()
            .map(|reference| resolve_edge(&observation.url, reference, &lookup))
            .collect();

        let expands = observation.is_base || url == base || observation.outcome.is_extracted();
        if expands {
            for reference in references {
                if let Some((target, _)) = lookup.get_key_value(&reference.canonical) {
                    if !done.contains(*target) {
                        pending.push_back(*target);
                    }
                }
            }
        }

        pages.push(ResultPage {
            url: observation.url.clone(),
            title: observation.title().map(str::to_string),
            http_status: observation.status(),
            error: observation.error().map(str::to_string),
            depth: observation.depth,
            is_base: observation.is_base || url == base,
            links,
        });
    }

    let broken: Vec<LinkEdge> = pages
        .iter()
        .flat_map(|page| page.links.iter())
        .filter(|edge| edge.is_broken)
        .cloned()
        .collect();

    let stats = ReportStatistics::collect(&pages, &broken);

    tracing::info!(
        "Resolved {} pages, {} links, {} broken",
        pages.len(),
        stats.links_checked,
        broken.len()
    );

    CrawlReport {
        base_url: base.to_string(),
        generated_at: Utc::now(),
        pages,
        broken,
        stats,
    }
}

fn resolve_edge(
    source: &CanonicalUrl,
    reference: &LinkReference,
    lookup: &HashMap<&CanonicalUrl, &PageObservation>,
) -> LinkEdge {
    let target = lookup.get(&reference.canonical).copied();
    let crawled = target.is_some();

    let http_status = target.and_then(PageObservation::status);
    let error = target.and_then(|observation| observation.error().map(str::to_string));
    let fragment_valid = match (&reference.fragment, target) {
        (None, _) => true,
        // Resource fragments (`doc.pdf#page=3`) address the viewer, not an HTML id
        (Some(_), _) if reference.link_type == LinkType::Resource => true,
        (Some(fragment), Some(observation)) => observation.outcome.fragments().contains(fragment),
        // Status unknown rather than fragment missing
        (Some(_), None) => false,
    };

    let classification = assess(crawled, http_status, error.as_deref(), fragment_valid);

    LinkEdge {
        source: source.clone(),
        href: reference.href.clone(),
        url: reference.url.clone(),
        target: reference.canonical.clone(),
        text: reference.text.clone(),
        link_type: reference.link_type,
        is_image: reference.is_image,
        http_status,
        error,
        fragment: reference.fragment.clone(),
        fragment_valid,
        crawled,
        status: classification.status,
        issue_type: classification.issue_type,
        severity: classification.severity,
        is_broken: classification.is_broken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::PageOutcome;
    use crate::url::canonicalize;
    use std::collections::HashSet;

    fn canon(raw: &str) -> CanonicalUrl {
        canonicalize(raw, false).unwrap()
    }

    fn reference(target: &str, fragment: Option<&str>, link_type: LinkType) -> LinkReference {
        let url = match fragment {
            Some(f) => format!("{}#{}", target, f),
            None => target.to_string(),
        };
        LinkReference {
            href: url.clone(),
            url,
            canonical: canon(target),
            text: "link".to_string(),
            link_type,
            is_image: false,
            fragment: fragment.map(str::to_string),
        }
    }

    fn extracted(
        url: &str,
        depth: u32,
        fragments: &[&str],
        links: Vec<LinkReference>,
    ) -> PageObservation {
        PageObservation {
            url: canon(url),
            requested_url: url.to_string(),
            is_base: depth == 0,
            depth,
            referrer: None,
            outcome: PageOutcome::Extracted {
                status: 200,
                title: Some(format!("Title of {}", url)),
                fragments: fragments.iter().map(|f| f.to_string()).collect(),
                links,
            },
        }
    }

    fn leaf(url: &str, depth: u32, status: Option<u16>, error: Option<&str>) -> PageObservation {
        PageObservation {
            url: canon(url),
            requested_url: url.to_string(),
            is_base: false,
            depth,
            referrer: None,
            outcome: PageOutcome::NotExtracted {
                status,
                error: error.map(str::to_string),
                title: None,
                fragments: HashSet::new(),
            },
        }
    }

    fn edge<'a>(report: &'a CrawlReport, source: &str, target: &str) -> &'a LinkEdge {
        report
            .pages
            .iter()
            .find(|p| p.url == canon(source))
            .and_then(|p| p.links.iter().find(|e| e.url == target))
            .unwrap()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let a = "https://site.test";
        let observations = vec![
            extracted(
                a,
                0,
                &["section1"],
                vec![
                    reference("https://site.test/b", None, LinkType::Internal),
                    reference("https://site.test/c", None, LinkType::Internal),
                    reference(a, Some("section1"), LinkType::Internal),
                ],
            ),
            extracted("https://site.test/b", 1, &[], vec![]),
            leaf("https://site.test/c", 1, Some(404), None),
        ];

        let report = resolve(&canon(a), &observations);

        let ab = edge(&report, a, "https://site.test/b");
        assert!(ab.crawled);
        assert!(!ab.is_broken);
        assert_eq!(ab.status, LinkStatus::Ok);

        let ac = edge(&report, a, "https://site.test/c");
        assert!(ac.is_broken);
        assert_eq!(ac.severity, Some(Severity::High));
        assert_eq!(ac.issue_type, Some(IssueType::NotFound));

        let aa = edge(&report, a, "https://site.test#section1");
        assert!(aa.fragment_valid);
        assert!(!aa.is_broken);

        assert_eq!(report.broken.len(), 1);
        assert_eq!(report.pages.len(), 3);
        assert!(report.pages[0].is_base);
    }

    #[test]
    fn test_missing_fragment_is_broken() {
        let observations = vec![
            extracted(
                "https://site.test",
                0,
                &[],
                vec![reference("https://site.test/b", Some("gone"), LinkType::Internal)],
            ),
            extracted("https://site.test/b", 1, &["present"], vec![]),
        ];

        let report = resolve(&canon("https://site.test"), &observations);
        let e = edge(&report, "https://site.test", "https://site.test/b#gone");
        assert!(e.crawled);
        assert!(!e.fragment_valid);
        assert!(e.is_broken);
        assert_eq!(e.status, LinkStatus::MissingFragment);
    }

    #[test]
    fn test_resource_fragments_are_valid() {
        let observations = vec![
            extracted(
                "https://site.test",
                0,
                &[],
                vec![
                    reference("https://site.test/doc.pdf", Some("page=3"), LinkType::Resource),
                    reference("https://site.test/gone.pdf", Some("page=1"), LinkType::Resource),
                ],
            ),
            leaf("https://site.test/doc.pdf", 1, Some(200), None),
            leaf("https://site.test/gone.pdf", 1, Some(404), None),
        ];

        let report = resolve(&canon("https://site.test"), &observations);
        let pdf = edge(&report, "https://site.test", "https://site.test/doc.pdf#page=3");
        assert!(pdf.fragment_valid);
        assert!(!pdf.is_broken);
        assert_eq!(pdf.status, LinkStatus::Ok);

        let gone = edge(&report, "https://site.test", "https://site.test/gone.pdf#page=1");
        assert!(gone.is_broken);
        assert_eq!(gone.http_status, Some(404));
        assert_eq!(report.broken.len(), 1);
    }

    #[test]
    fn test_uncrawled_is_not_broken() {
        let observations = vec![extracted(
            "https://site.test",
            0,
            &[],
            vec![
                reference("https://site.test/deep", None, LinkType::Internal),
                reference("https://site.test/deep2", Some("x"), LinkType::Internal),
            ],
        )];

        let report = resolve(&canon("https://site.test"), &observations);
        let plain = edge(&report, "https://site.test", "https://site.test/deep");
        assert!(!plain.crawled);
        assert!(!plain.is_broken);
        assert!(plain.fragment_valid);
        assert_eq!(plain.status, LinkStatus::Uncrawled);
        assert_eq!(plain.http_status, None);

        let with_fragment = edge(&report, "https://site.test", "https://site.test/deep2#x");
        assert!(!with_fragment.fragment_valid);
        assert!(!with_fragment.is_broken);
        assert!(report.broken.is_empty());
        assert_eq!(report.pages.len(), 1);
    }

    #[test]
    fn test_unreachable_observations_are_ignored() {
        let observations = vec![
            extracted("https://site.test", 0, &[], vec![]),
            extracted(
                "https://site.test/orphan",
                1,
                &[],
                vec![reference("https://site.test/gone", None, LinkType::Internal)],
            ),
            leaf("https://site.test/gone", 2, Some(404), None),
        ];

        let report = resolve(&canon("https://site.test"), &observations);
        assert_eq!(report.pages.len(), 1);
        assert!(report.broken.is_empty());
    }

    #[test]
    fn test_leaves_do_not_expand() {
        let observations = vec![
            extracted(
                "https://site.test",
                0,
                &[],
                vec![reference("https://other.test", None, LinkType::External)],
            ),
            leaf("https://other.test", 1, Some(200), None),
            extracted("https://other.test/next", 2, &[], vec![]),
        ];

        let report = resolve(&canon("https://site.test"), &observations);
        let urls: Vec<&str> = report.pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["https://site.test", "https://other.test"]);
        assert!(report.pages[1].links.is_empty());
    }

    #[test]
    fn test_last_write_wins() {
        let observations = vec![
            extracted(
                "https://site.test",
                0,
                &[],
                vec![reference("https://site.test/flaky", None, LinkType::Internal)],
            ),
            leaf("https://site.test/flaky", 1, None, Some("Request timed out")),
            leaf("https://site.test/flaky", 1, Some(500), None),
        ];

        let report = resolve(&canon("https://site.test"), &observations);
        let e = edge(&report, "https://site.test", "https://site.test/flaky");
        assert_eq!(e.http_status, Some(500));
        assert_eq!(e.status, LinkStatus::ServerError);
        assert_eq!(e.error, None);
    }

    #[test]
    fn test_each_source_gets_its_own_edge() {
        let observations = vec![
            extracted(
                "https://site.test",
                0,
                &[],
                vec![
                    reference("https://site.test/b", None, LinkType::Internal),
                    reference("https://site.test/dead", None, LinkType::Internal),
                ],
            ),
            extracted(
                "https://site.test/b",
                1,
                &[],
                vec![reference("https://site.test/dead", None, LinkType::Internal)],
            ),
            leaf("https://site.test/dead", 1, Some(410), None),
        ];

        let report = resolve(&canon("https://site.test"), &observations);
        assert_eq!(report.broken.len(), 2);
        let sources: Vec<&str> = report.broken.iter().map(|e| e.source.as_str()).collect();
        assert_eq!(sources, vec!["https://site.test", "https://site.test/b"]);
    }

    #[test]
    fn test_timeout_target() {
        let observations = vec![
            extracted(
                "https://site.test",
                0,
                &[],
                vec![reference("https://slow.test/page", None, LinkType::External)],
            ),
            leaf("https://slow.test/page", 1, None, Some("Request timed out: operation timed out")),
        ];

        let report = resolve(&canon("https://site.test"), &observations);
        let e = edge(&report, "https://site.test", "https://slow.test/page");
        assert_eq!(e.status, LinkStatus::Timeout);
        assert!(e.is_broken);
        assert_eq!(e.http_status, None);
    }

    #[test]
    fn test_empty_observations() {
        let report = resolve(&canon("https://site.test"), &[]);
        assert!(report.pages.is_empty());
        assert!(report.broken.is_empty());
        assert_eq!(report.base_url, "https://site.test");
        assert_eq!(report.edge_count(), 0);
    }
}
