//! Broken-link notifications
//!
//! When a run finds broken links and destinations are configured, a compact summary
//! is POSTed as JSON to each destination. Delivery failures are logged and never fail
//! the run.

use crate::output::traits::Notifier;
use crate::resolver::{CrawlReport, LinkEdge};
use crate::OutputResult;
use async_trait::async_trait;
use serde::Serialize;

/// One broken link in a notification
#[derive(Debug, Serialize)]
struct BrokenLinkSummary<'a> {
    source: &'a str,
    url: &'a str,
    text: &'a str,
    status: &'static str,
    http_status: Option<u16>,
    severity: Option<&'static str>,
}

impl<'a> From<&'a LinkEdge> for BrokenLinkSummary<'a> {
    fn from(edge: &'a LinkEdge) -> Self {
        Self {
            source: edge.source.as_str(),
            url: &edge.url,
            text: &edge.text,
            status: edge.status.as_str(),
            http_status: edge.http_status,
            severity: edge.severity.map(|severity| severity.as_str()),
        }
    }
}

#[derive(Debug, Serialize)]
struct NotificationPayload<'a> {
    base_url: &'a str,
    generated_at: String,
    broken_count: usize,
    broken: Vec<BrokenLinkSummary<'a>>,
}

impl<'a> NotificationPayload<'a> {
    fn from_report(report: &'a CrawlReport) -> Self {
        Self {
            base_url: &report.base_url,
            generated_at: report.generated_at.to_rfc3339(),
            broken_count: report.broken.len(),
            broken: report.broken.iter().map(BrokenLinkSummary::from).collect(),
        }
    }
}

/// Delivers notifications as JSON webhooks
#[derive(Debug, Clone, Default)]
pub struct WebhookNotifier {
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, report: &CrawlReport, destination: &str) -> OutputResult<()> {
        let payload = NotificationPayload::from_report(report);

        self.client
            .post(destination)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        tracing::info!(
            "Notified {} of {} broken links",
            destination,
            payload.broken_count
        );
        Ok(())
    }
}

/// Sends notifications if the report has broken links and destinations exist
///
/// # Returns
///
/// The number of destinations that accepted the notification
pub async fn notify_if_needed(
    notifier: &dyn Notifier,
    report: &CrawlReport,
    destinations: &[String],
) -> usize {
    if !report.has_broken_links() {
        tracing::debug!("No broken links, skipping notifications");
        return 0;
    }
    if destinations.is_empty() {
        tracing::debug!("No notification destinations configured");
        return 0;
    }

    let mut delivered = 0;
    for destination in destinations {
        match notifier.notify(report, destination).await {
            Ok(()) => delivered += 1,
            Err(e) => tracing::warn!("Failed to notify {}: {}", destination, e),
        }
    }
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::sample_report;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_posts_broken_links() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_partial_json(serde_json::json!({
                "base_url": "https://site.test",
                "broken_count": 1,
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::default();
        let destinations = vec![format!("{}/hook", server.uri())];
        let delivered = notify_if_needed(&notifier, &sample_report(), &destinations).await;

        assert_eq!(delivered, 1);
    }

    #[tokio::test]
    async fn test_skipped_without_broken_links() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut report = sample_report();
        report.broken.clear();

        let destinations = vec![format!("{}/hook", server.uri())];
        let delivered =
            notify_if_needed(&WebhookNotifier::default(), &report, &destinations).await;
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_failed_delivery_is_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/up"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let destinations = vec![
            format!("{}/down", server.uri()),
            format!("{}/up", server.uri()),
        ];
        let delivered =
            notify_if_needed(&WebhookNotifier::default(), &sample_report(), &destinations).await;
        assert_eq!(delivered, 1);
    }
}
