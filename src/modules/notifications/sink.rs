use async_trait::async_trait;
use tracing::info;

use crate::db::NotificationType;

/// Delivery transport for outbound notifications. The engine never observes
/// or retries the result beyond recording it in the notification log.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(
        &self,
        kind: NotificationType,
        destination: &str,
        subject: Option<&str>,
        body: &str,
    ) -> anyhow::Result<()>;
}

/// Mock transport: writes the message to the log instead of sending it.
/// Used whenever real delivery is disabled.
pub struct LogSink {
    from: String,
}

impl LogSink {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(
        &self,
        kind: NotificationType,
        destination: &str,
        subject: Option<&str>,
        body: &str,
    ) -> anyhow::Result<()> {
        match kind {
            NotificationType::Email => {
                info!(
                    "[Mock Email] From: {}, To: {}, Subject: {}, Body: {}",
                    self.from,
                    destination,
                    subject.unwrap_or(""),
                    body
                );
            }
            NotificationType::Whatsapp => {
                info!("[Mock WhatsApp] To: {}, Message: {}", destination, body);
            }
        }
        Ok(())
    }
}
