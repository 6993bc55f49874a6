use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::error::DatabaseError;
use crate::db::models::{NewNotificationLog, NotificationLog};
use crate::db::store::NotificationLogStore;

pub struct NotificationLogRepository {
    pool: PgPool,
}

impl NotificationLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationLogStore for NotificationLogRepository {
    async fn insert(&self, log: &NewNotificationLog) -> Result<NotificationLog, DatabaseError> {
        let row = sqlx::query_as::<_, NotificationLog>(
            r#"
            INSERT INTO notification_log
                (user_id, notification_type, destination, subject, payload, status, error_message, sent_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(log.user_id)
        .bind(log.notification_type)
        .bind(&log.destination)
        .bind(log.subject.as_deref())
        .bind(&log.payload)
        .bind(log.status)
        .bind(log.error_message.as_deref())
        .bind(log.sent_at)
        .bind(log.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
