//! Fire-and-forget batch notification
//!
//! Delivery is best-effort: failures are logged and never surface into the
//! pipeline, and ingestion never waits on a notification.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::models::ParsedMessage;
use super::Result;

/// Notification channel for freshly parsed batches
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Dispatch one parsed batch; infallible from the caller's view
    async fn notify_batch(&self, messages: &[ParsedMessage]);
}

/// POSTs batches as JSON to a configured webhook
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify_batch(&self, messages: &[ParsedMessage]) {
        if messages.is_empty() {
            return;
        }

        match self.client.post(&self.url).json(&messages).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(count = messages.len(), "notified batch");
            },
            Ok(response) => {
                warn!(
                    status = %response.status(),
                    count = messages.len(),
                    "notification webhook rejected batch"
                );
            },
            Err(e) => {
                warn!(error = %e, count = messages.len(), "notification dispatch failed");
            },
        }
    }
}

/// Used when no webhook is configured
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify_batch(&self, messages: &[ParsedMessage]) {
        debug!(count = messages.len(), "notifications disabled, dropping batch");
    }
}
