use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    Email,
    Whatsapp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "notification_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
}

/// Audit row for every attempted outbound notification, written regardless
/// of delivery outcome.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct NotificationLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub notification_type: NotificationType,
    pub destination: String,
    pub subject: Option<String>,
    pub payload: String,
    pub status: NotificationStatus,
    pub error_message: Option<String>,
    pub sent_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewNotificationLog {
    pub user_id: Option<Uuid>,
    pub notification_type: NotificationType,
    pub destination: String,
    pub subject: Option<String>,
    pub payload: String,
    pub status: NotificationStatus,
    pub error_message: Option<String>,
    pub sent_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}
