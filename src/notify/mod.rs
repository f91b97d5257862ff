pub mod log;
pub mod sender;
pub mod webhook;

use std::sync::Arc;

pub use log::LogNotifier;
pub use sender::NotificationSender;
pub use webhook::WebhookNotifier;

use crate::config::ScanSettings;
use tracing::warn;

/// Webhook delivery when a URL is configured, otherwise log-only.
pub fn create_notifier(settings: &ScanSettings) -> Arc<dyn NotificationSender> {
    match &settings.webhook_url {
        Some(url) => match WebhookNotifier::new(url, settings.notify_timeout) {
            Ok(notifier) => Arc::new(notifier),
            Err(e) => {
                warn!(error = %e, "Falling back to log notifier");
                Arc::new(LogNotifier)
            }
        },
        None => Arc::new(LogNotifier),
    }
}
