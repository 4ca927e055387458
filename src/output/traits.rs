//! Report sink and notifier traits
//!
//! Sinks persist or export the final report; notifiers deliver it to external
//! destinations. Neither influences resolution.

use crate::resolver::CrawlReport;
use crate::OutputResult;
use async_trait::async_trait;

/// Trait for report sinks
///
/// A sink receives the resolved report (ordered result pages with their edges, plus the
/// flattened broken-edge list) once per run.
pub trait ReportSink {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// Writes the report
    ///
    /// # Arguments
    ///
    /// * `report` - The resolved crawl report
    fn write(&self, report: &CrawlReport) -> OutputResult<()>;
}

/// Trait for broken-link notifiers
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers the report's broken edges to one destination
    ///
    /// # Arguments
    ///
    /// * `report` - The resolved crawl report (its `broken` list is non-empty)
    /// * `destination` - Where to deliver the notification
    async fn notify(&self, report: &CrawlReport, destination: &str) -> OutputResult<()>;
}
