//! Webhook notification for breaking results

use crate::host::TaskHost;
use apidiff_task_common::DiffResult;
use apidiff_task_loader::HttpClient;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// What happened to the notification for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyStatus {
    /// Nothing breaking; no request made
    Skipped,

    /// Delivered; the response status
    Sent(u16),

    /// Delivery failed; logged and otherwise ignored
    Failed(String),
}

/// Posts the full diff result to a webhook when it contains breaking findings
#[derive(Clone)]
pub struct WebhookNotifier {
    http: Arc<dyn HttpClient>,
    url: String,
}

impl WebhookNotifier {
    pub fn new(http: Arc<dyn HttpClient>, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The result exactly as the engine produced it
    pub fn payload(result: &DiffResult) -> serde_json::Result<Value> {
        serde_json::to_value(result)
    }

    /// Best-effort delivery; the outcome of the run never depends on it
    pub async fn notify(&self, result: &DiffResult, host: &mut dyn TaskHost) -> NotifyStatus {
        if !result.has_breaking() {
            return NotifyStatus::Skipped;
        }

        let payload = match Self::payload(result) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "failed to serialize webhook payload");
                host.debug(&format!(
                    "Failed to send notification to webhook {}: {}",
                    self.url, e
                ));
                return NotifyStatus::Failed(e.to_string());
            }
        };

        match self.http.post_json(&self.url, &payload).await {
            Ok(status) => {
                info!(url = %self.url, status, "sent webhook notification");
                host.debug(&format!(
                    "Sent notification to webhook {}. Response {}",
                    self.url, status
                ));
                NotifyStatus::Sent(status)
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "webhook notification failed");
                host.debug(&format!(
                    "Failed to send notification to webhook {}: {}",
                    self.url, e
                ));
                NotifyStatus::Failed(e.to_string())
            }
        }
    }
}
