//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a crawl report:
//! run information, statistics, and broken links grouped by source page.

use crate::output::traits::ReportSink;
use crate::resolver::{CrawlReport, LinkEdge};
use crate::OutputResult;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// Writes the markdown summary to a file
#[derive(Debug, Clone)]
pub struct MarkdownSink {
    path: PathBuf,
}

impl MarkdownSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for MarkdownSink {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn write(&self, report: &CrawlReport) -> OutputResult<()> {
        let markdown = format_markdown_summary(report);

        let mut file = File::create(&self.path)?;
        file.write_all(markdown.as_bytes())?;

        tracing::info!("Markdown summary written to {}", self.path.display());
        Ok(())
    }
}

/// Formats a crawl report as markdown
///
/// # Arguments
///
/// * `report` - The resolved crawl report
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_summary(report: &CrawlReport) -> String {
    let stats = &report.stats;
    let mut md = String::new();

    md.push_str("# Broken Link Report\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Base URL**: {}\n", report.base_url));
    md.push_str(&format!(
        "- **Generated**: {}\n\n",
        report.generated_at.to_rfc3339()
    ));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Crawled**: {}\n", stats.pages_crawled));
    md.push_str(&format!("- **Links Checked**: {}\n", stats.links_checked));
    md.push_str(&format!(
        "- **Broken Links**: {} ({:.2}%)\n",
        stats.broken_links,
        stats.broken_rate()
    ));
    md.push_str(&format!("- **Uncrawled Links**: {}\n", stats.uncrawled_links));
    md.push_str(&format!("- **Redirects**: {}\n\n", stats.redirects));

    if !stats.broken_by_severity.is_empty() {
        md.push_str("## Broken Links by Severity\n\n");
        md.push_str("| Severity | Count |\n");
        md.push_str("|----------|-------|\n");
        for severity in ["high", "medium", "low"] {
            if let Some(count) = stats.broken_by_severity.get(severity) {
                md.push_str(&format!("| {} | {} |\n", severity, count));
            }
        }
        md.push('\n');
    }

    if !stats.broken_by_issue.is_empty() {
        md.push_str("## Broken Links by Issue\n\n");
        md.push_str("| Issue | Count |\n");
        md.push_str("|-------|-------|\n");
        for (issue, count) in &stats.broken_by_issue {
            md.push_str(&format!("| {} | {} |\n", issue, count));
        }
        md.push('\n');
    }

    if report.broken.is_empty() {
        md.push_str("No broken links found.\n");
        return md;
    }

    md.push_str("## Broken Links\n\n");
    for (source, edges) in group_by_source(&report.broken) {
        md.push_str(&format!("### {}\n\n", source));
        md.push_str("| Severity | Status | Link | Text |\n");
        md.push_str("|----------|--------|------|------|\n");
        for edge in edges {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                edge.severity.map(|s| s.as_str()).unwrap_or("-"),
                describe_status(edge),
                edge.url,
                escape_cell(&edge.text)
            ));
        }
        md.push('\n');
    }

    md
}

/// Groups broken edges by source page, most severe first within each page
fn group_by_source(broken: &[LinkEdge]) -> BTreeMap<&str, Vec<&LinkEdge>> {
    let mut groups: BTreeMap<&str, Vec<&LinkEdge>> = BTreeMap::new();
    for edge in broken {
        groups.entry(edge.source.as_str()).or_default().push(edge);
    }
    for edges in groups.values_mut() {
        edges.sort_by(|a, b| b.severity.cmp(&a.severity));
    }
    groups
}

fn describe_status(edge: &LinkEdge) -> String {
    match edge.http_status {
        Some(code) => format!("{} ({})", edge.status, code),
        None => edge.status.to_string(),
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
