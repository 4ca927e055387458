//! JSON report export

use crate::output::stats::ReportStatistics;
use crate::output::traits::ReportSink;
use crate::resolver::{CrawlReport, LinkEdge};
use crate::OutputResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Report shape written when only broken links are kept
#[derive(Debug, Serialize)]
struct BrokenOnlyReport<'a> {
    base_url: &'a str,
    generated_at: &'a DateTime<Utc>,
    broken: &'a [LinkEdge],
    stats: &'a ReportStatistics,
}

/// Writes the report as pretty-printed JSON
#[derive(Debug, Clone)]
pub struct JsonSink {
    path: PathBuf,
    only_broken: bool,
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>, only_broken: bool) -> Self {
        Self {
            path: path.into(),
            only_broken,
        }
    }

    /// Serializes the report to a JSON string
    pub fn render(&self, report: &CrawlReport) -> OutputResult<String> {
        let json = if self.only_broken {
            serde_json::to_string_pretty(&BrokenOnlyReport {
                base_url: &report.base_url,
                generated_at: &report.generated_at,
                broken: &report.broken,
                stats: &report.stats,
            })?
        } else {
            serde_json::to_string_pretty(report)?
        };
        Ok(json)
    }
}

impl ReportSink for JsonSink {
    fn name(&self) -> &'static str {
        "json"
    }

    fn write(&self, report: &CrawlReport) -> OutputResult<()> {
        let json = self.render(report)?;

        let mut writer = BufWriter::new(File::create(&self.path)?);
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::info!("JSON report written to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::sample_report;
    use tempfile::TempDir;

    #[test]
    fn test_full_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        JsonSink::new(&path, false).write(&sample_report()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["base_url"], "https://site.test");
        assert_eq!(value["pages"].as_array().unwrap().len(), 1);
        assert_eq!(value["broken"].as_array().unwrap().len(), 1);
        assert_eq!(value["broken"][0]["status"], "Not Found");
        assert_eq!(value["broken"][0]["issue_type"], "404_not_found");
        assert_eq!(value["broken"][0]["severity"], "high");
        assert_eq!(value["broken"][0]["link_type"], "internal");
        assert_eq!(value["stats"]["broken_links"], 1);
    }

    #[test]
    fn test_broken_only_report() {
        let sink = JsonSink::new("unused.json", true);
        let value: serde_json::Value =
            serde_json::from_str(&sink.render(&sample_report()).unwrap()).unwrap();

        assert!(value.get("pages").is_none());
        assert_eq!(value["broken"].as_array().unwrap().len(), 1);
        assert_eq!(value["stats"]["links_checked"], 2);
    }

    #[test]
    fn test_unwritable_path() {
        let sink = JsonSink::new("/nonexistent-dir/report.json", false);
        assert!(sink.write(&sample_report()).is_err());
    }
}
