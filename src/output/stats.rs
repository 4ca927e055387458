//! Report statistics
//!
//! This module derives summary counts from resolved result pages and displays them.

use crate::resolver::status::LinkStatus;
use crate::resolver::{LinkEdge, ResultPage};
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary counts of one crawl report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportStatistics {
    /// Number of observed pages in the reachable graph
    pub pages_crawled: u64,

    /// Number of resolved link edges
    pub links_checked: u64,

    /// Number of broken edges
    pub broken_links: u64,

    /// Number of edges whose target was never crawled
    pub uncrawled_links: u64,

    /// Number of edges whose target answered with a redirect
    pub redirects: u64,

    /// Broken edge count by severity (`high`, `medium`, `low`)
    pub broken_by_severity: BTreeMap<String, u64>,

    /// Broken edge count by issue type
    pub broken_by_issue: BTreeMap<String, u64>,
}

impl ReportStatistics {
    /// Collects statistics from resolved pages and their broken edges
    pub fn collect(pages: &[ResultPage], broken: &[LinkEdge]) -> Self {
        let edges = || pages.iter().flat_map(|page| page.links.iter());

        let mut stats = Self {
            pages_crawled: pages.len() as u64,
            links_checked: edges().count() as u64,
            broken_links: broken.len() as u64,
            uncrawled_links: edges().filter(|edge| !edge.crawled).count() as u64,
            redirects: edges()
                .filter(|edge| edge.status == LinkStatus::Redirect)
                .count() as u64,
            ..Self::default()
        };

        for edge in broken {
            if let Some(severity) = edge.severity {
                *stats
                    .broken_by_severity
                    .entry(severity.to_string())
                    .or_insert(0) += 1;
            }
            if let Some(issue) = edge.issue_type {
                *stats.broken_by_issue.entry(issue.to_string()).or_insert(0) += 1;
            }
        }

        stats
    }

    /// Share of checked links that are broken, as a percentage
    pub fn broken_rate(&self) -> f64 {
        if self.links_checked == 0 {
            return 0.0;
        }
        (self.broken_links as f64 / self.links_checked as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &ReportStatistics) {
    println!("=== Link Check Statistics ===\n");

    println!("Overview:");
    println!("  Pages crawled: {}", stats.pages_crawled);
    println!("  Links checked: {}", stats.links_checked);
    println!(
        "  Broken links: {} ({:.1}%)",
        stats.broken_links,
        stats.broken_rate()
    );
    println!("  Uncrawled links: {}", stats.uncrawled_links);
    println!("  Redirects: {}", stats.redirects);
    println!();

    if !stats.broken_by_severity.is_empty() {
        println!("Broken by Severity:");
        for severity in ["high", "medium", "low"] {
            if let Some(count) = stats.broken_by_severity.get(severity) {
                println!("  {}: {}", severity, count);
            }
        }
        println!();
    }

    if !stats.broken_by_issue.is_empty() {
        println!("Broken by Issue:");
        // Sort issues by count (descending)
        let mut issue_counts: Vec<_> = stats.broken_by_issue.iter().collect();
        issue_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (issue, count) in issue_counts {
            println!("  {}: {}", issue, count);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::LinkType;
    use crate::resolver::status::{assess, IssueType, Severity};
    use crate::url::canonicalize;

    fn edge(status: Option<u16>, crawled: bool) -> LinkEdge {
        let c = assess(crawled, status, None, true);
        LinkEdge {
            source: canonicalize("https://site.test", false).unwrap(),
            href: "/x".to_string(),
            url: "https://site.test/x".to_string(),
            target: canonicalize("https://site.test/x", false).unwrap(),
            text: "x".to_string(),
            link_type: LinkType::Internal,
            is_image: false,
            http_status: status,
            error: None,
            fragment: None,
            fragment_valid: true,
            crawled,
            status: c.status,
            issue_type: c.issue_type,
            severity: c.severity,
            is_broken: c.is_broken,
        }
    }

    fn page(links: Vec<LinkEdge>) -> ResultPage {
        ResultPage {
            url: canonicalize("https://site.test", false).unwrap(),
            title: None,
            http_status: Some(200),
            error: None,
            depth: 0,
            is_base: true,
            links,
        }
    }

    #[test]
    fn test_collect() {
        let links = vec![
            edge(Some(200), true),
            edge(Some(404), true),
            edge(Some(503), true),
            edge(Some(301), true),
            edge(None, false),
        ];
        let broken: Vec<LinkEdge> = links.iter().filter(|e| e.is_broken).cloned().collect();
        let stats = ReportStatistics::collect(&[page(links)], &broken);

        assert_eq!(stats.pages_crawled, 1);
        assert_eq!(stats.links_checked, 5);
        assert_eq!(stats.broken_links, 2);
        assert_eq!(stats.uncrawled_links, 1);
        assert_eq!(stats.redirects, 1);
        assert_eq!(stats.broken_by_severity.get(Severity::High.as_str()), Some(&1));
        assert_eq!(stats.broken_by_severity.get(Severity::Medium.as_str()), Some(&1));
        assert_eq!(stats.broken_by_issue.get(IssueType::NotFound.as_str()), Some(&1));
        assert_eq!(stats.broken_by_issue.get(IssueType::ServerError.as_str()), Some(&1));
    }

    #[test]
    fn test_broken_rate() {
        let stats = ReportStatistics {
            links_checked: 80,
            broken_links: 20,
            ..ReportStatistics::default()
        };
        assert!((stats.broken_rate() - 25.0).abs() < 0.01);
        assert_eq!(ReportStatistics::default().broken_rate(), 0.0);
    }

    #[test]
    fn test_empty_report() {
        let stats = ReportStatistics::collect(&[], &[]);
        assert_eq!(stats, ReportStatistics::default());
    }
}
