use async_trait::async_trait;
use tracing::info;
use crate::errors::DeepScanError;
use super::sender::NotificationSender;

/// Writes alerts to the log. Used when no delivery channel is configured.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSender for LogNotifier {
    async fn send_alert(&self, recipient: &str, subject: &str, detail: &str) -> Result<(), DeepScanError> {
        info!(recipient = %recipient, subject = %subject, detail = %detail, "Alert (log only)");
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
