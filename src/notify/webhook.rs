use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use crate::errors::DeepScanError;
use super::sender::NotificationSender;
use tracing::debug;

/// POSTs alerts as JSON to a configured URL.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    /// `timeout` bounds the whole request, connect through body.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, DeepScanError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeepScanError::Notification(format!("Webhook client setup failed: {}", e)))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl NotificationSender for WebhookNotifier {
    async fn send_alert(&self, recipient: &str, subject: &str, detail: &str) -> Result<(), DeepScanError> {
        let body = json!({
            "recipient": recipient,
            "subject": subject,
            "detail": detail,
        });

        let resp = self.client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DeepScanError::Notification(format!("Webhook request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DeepScanError::Notification(format!(
                "Webhook returned {} for {}",
                status, self.url
            )));
        }

        debug!(url = %self.url, recipient = %recipient, "Alert delivered");
        Ok(())
    }

    fn name(&self) -> &str {
        "webhook"
    }
}
