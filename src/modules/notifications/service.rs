use std::sync::Arc;

use tracing::{debug, error};

use crate::clock::Clock;
use crate::db::{
    Advisory, NewNotificationLog, NotificationLogStore, NotificationStatus, NotificationType, User,
};

use super::sink::NotificationSink;

/// Best-effort notification fan-out. Every attempt is recorded in the
/// notification log; no failure ever reaches the caller.
pub struct NotificationService {
    log: Arc<dyn NotificationLogStore>,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
}

impl NotificationService {
    pub fn new(
        log: Arc<dyn NotificationLogStore>,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { log, sink, clock }
    }

    pub async fn advisory_requested(&self, programmer: &User, external: &User, advisory: &Advisory) {
        let subject = "New advisory request";
        let body = format!(
            "{} ({}) has requested an advisory for {}. Comment: {}",
            external.name,
            external.email,
            advisory.scheduled_at,
            advisory.request_comment.as_deref().unwrap_or("no comment")
        );

        self.send_email(programmer, subject, &body).await;
        self.send_whatsapp(
            programmer,
            &format!("New advisory request from {}", external.name),
        )
        .await;
    }

    pub async fn advisory_approved(&self, external: &User, programmer: &User, advisory: &Advisory) {
        let subject = "Your advisory has been approved";
        let body = format!(
            "{} has approved your advisory request for {}. Message: {}",
            programmer.name,
            advisory.scheduled_at,
            advisory.response_message.as_deref().unwrap_or("no message")
        );

        self.send_email(external, subject, &body).await;
        self.send_whatsapp(
            external,
            &format!("Your advisory with {} was approved", programmer.name),
        )
        .await;
    }

    pub async fn advisory_rejected(&self, external: &User, programmer: &User, advisory: &Advisory) {
        let subject = "Your advisory has been rejected";
        let body = format!(
            "{} has rejected your advisory request. Message: {}",
            programmer.name,
            advisory.response_message.as_deref().unwrap_or("no message")
        );

        self.send_email(external, subject, &body).await;
    }

    pub async fn advisory_reminder(&self, user: &User, advisory: &Advisory) {
        let subject = "Advisory reminder";
        let body = format!(
            "You have an advisory scheduled for tomorrow at {}.",
            advisory.scheduled_at.time()
        );

        self.send_email(user, subject, &body).await;
        self.send_whatsapp(
            user,
            &format!("Reminder: advisory tomorrow at {}", advisory.scheduled_at.time()),
        )
        .await;
    }

    async fn send_email(&self, user: &User, subject: &str, body: &str) {
        let outcome = self
            .sink
            .deliver(NotificationType::Email, &user.email, Some(subject), body)
            .await;
        self.record(
            user,
            NotificationType::Email,
            user.email.clone(),
            Some(subject.to_string()),
            body.to_string(),
            outcome,
        )
        .await;
    }

    async fn send_whatsapp(&self, user: &User, message: &str) {
        let Some(phone) = user.phone.clone() else {
            debug!("No phone number for user: {}", user.email);
            return;
        };
        let outcome = self
            .sink
            .deliver(NotificationType::Whatsapp, &phone, None, message)
            .await;
        self.record(
            user,
            NotificationType::Whatsapp,
            phone,
            None,
            message.to_string(),
            outcome,
        )
        .await;
    }

    async fn record(
        &self,
        user: &User,
        kind: NotificationType,
        destination: String,
        subject: Option<String>,
        payload: String,
        outcome: anyhow::Result<()>,
    ) {
        let now = self.clock.now();
        let (status, error_message, sent_at) = match outcome {
            Ok(()) => (NotificationStatus::Sent, None, Some(now)),
            Err(err) => {
                error!("Failed to send {:?} to {}: {}", kind, destination, err);
                (NotificationStatus::Failed, Some(err.to_string()), None)
            }
        };

        let log = NewNotificationLog {
            user_id: Some(user.id),
            notification_type: kind,
            destination,
            subject,
            payload,
            status,
            error_message,
            sent_at,
            created_at: now,
        };
        if let Err(err) = self.log.insert(&log).await {
            error!("Failed to record notification log entry: {}", err);
        }
    }
}
