//! Output module for exporting crawl reports
//!
//! This module handles:
//! - Writing the JSON report and the markdown summary
//! - Recording runs in an optional SQLite database
//! - Computing and printing report statistics
//! - Notifying external destinations about broken links

mod json;
mod markdown;
mod notifier;
mod sqlite_output;
pub mod stats;
mod traits;

pub use json::JsonSink;
pub use markdown::{format_markdown_summary, MarkdownSink};
pub use notifier::{notify_if_needed, WebhookNotifier};
pub use sqlite_output::{initialize_schema, load_run_statistics, SqliteSink};
pub use stats::{print_statistics, ReportStatistics};
pub use traits::{Notifier, ReportSink};

use crate::config::OutputConfig;
use crate::resolver::CrawlReport;
use crate::OutputResult;

/// Builds the sinks configured for a run
///
/// # Arguments
///
/// * `config` - Output configuration
/// * `config_hash` - Hash of the configuration, recorded with database runs
pub fn configured_sinks(config: &OutputConfig, config_hash: &str) -> Vec<Box<dyn ReportSink>> {
    let mut sinks: Vec<Box<dyn ReportSink>> = vec![
        Box::new(JsonSink::new(
            &config.report_path,
            config.save_only_broken_links,
        )),
        Box::new(MarkdownSink::new(&config.summary_path)),
    ];

    if let Some(database_path) = &config.database_path {
        sinks.push(Box::new(SqliteSink::new(
            database_path,
            config_hash,
            config.save_only_broken_links,
        )));
    }

    sinks
}

/// Writes the report to every configured sink
///
/// Stops at the first failing sink.
pub fn write_report(
    report: &CrawlReport,
    config: &OutputConfig,
    config_hash: &str,
) -> OutputResult<()> {
    for sink in configured_sinks(config, config_hash) {
        tracing::debug!("Writing report to {} sink", sink.name());
        sink.write(report)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::ReportStatistics;
    use crate::links::LinkType;
    use crate::resolver::status::assess;
    use crate::resolver::{CrawlReport, LinkEdge, ResultPage};
    use crate::url::canonicalize;
    use chrono::Utc;

    fn edge(target: &str, text: &str, status: u16) -> LinkEdge {
        let c = assess(true, Some(status), None, true);
        LinkEdge {
            source: canonicalize("https://site.test", false).unwrap(),
            href: target.to_string(),
            url: target.to_string(),
            target: canonicalize(target, false).unwrap(),
            text: text.to_string(),
            link_type: LinkType::Internal,
            is_image: false,
            http_status: Some(status),
            error: None,
            fragment: None,
            fragment_valid: true,
            crawled: true,
            status: c.status,
            issue_type: c.issue_type,
            severity: c.severity,
            is_broken: c.is_broken,
        }
    }

    /// Base page with one working link and one 404
    pub fn sample_report() -> CrawlReport {
        let pages = vec![ResultPage {
            url: canonicalize("https://site.test", false).unwrap(),
            title: Some("Home".to_string()),
            http_status: Some(200),
            error: None,
            depth: 0,
            is_base: true,
            links: vec![
                edge("https://site.test/b", "B", 200),
                edge("https://site.test/c", "C | page", 404),
            ],
        }];
        let broken: Vec<LinkEdge> = pages[0]
            .links
            .iter()
            .filter(|e| e.is_broken)
            .cloned()
            .collect();
        let stats = ReportStatistics::collect(&pages, &broken);

        CrawlReport {
            base_url: "https://site.test".to_string(),
            generated_at: Utc::now(),
            pages,
            broken,
            stats,
        }
    }
}
