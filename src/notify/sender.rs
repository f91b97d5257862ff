use async_trait::async_trait;
use crate::errors::DeepScanError;

/// Delivers an alert about a scan subject to its owner.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send_alert(&self, recipient: &str, subject: &str, detail: &str) -> Result<(), DeepScanError>;
    fn name(&self) -> &str;
}
