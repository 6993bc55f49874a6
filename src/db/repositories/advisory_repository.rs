use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::error::DatabaseError;
use crate::db::models::{Advisory, AdvisoryStatus, NewAdvisory};
use crate::db::store::AdvisoryStore;

pub struct AdvisoryRepository {
    pool: PgPool,
}

impl AdvisoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdvisoryStore for AdvisoryRepository {
    async fn insert(
        &self,
        external_id: Uuid,
        advisory: &NewAdvisory,
        now: OffsetDateTime,
    ) -> Result<Advisory, DatabaseError> {
        // The partial unique index on (programmer_id, scheduled_at) over live
        // statuses turns a concurrent double-booking into a unique violation,
        // surfaced as DatabaseError::Duplicate.
        let row = sqlx::query_as::<_, Advisory>(
            r#"
            INSERT INTO advisories
                (programmer_id, external_id, scheduled_at, status, request_comment, created_at, updated_at)
            VALUES ($1, $2, $3, 'pending', $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(advisory.programmer_id)
        .bind(external_id)
        .bind(advisory.scheduled_at)
        .bind(advisory.comment.as_deref())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Advisory>, DatabaseError> {
        let row = sqlx::query_as::<_, Advisory>("SELECT * FROM advisories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_live_at(
        &self,
        programmer_id: Uuid,
        scheduled_at: OffsetDateTime,
    ) -> Result<Vec<Advisory>, DatabaseError> {
        let rows = sqlx::query_as::<_, Advisory>(
            r#"
            SELECT * FROM advisories
            WHERE programmer_id = $1
              AND scheduled_at = $2
              AND status IN ('pending', 'approved')
            "#,
        )
        .bind(programmer_id)
        .bind(scheduled_at)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: AdvisoryStatus,
        next: AdvisoryStatus,
        response_message: Option<&str>,
        updated_at: OffsetDateTime,
    ) -> Result<Option<Advisory>, DatabaseError> {
        // Guarded by the expected pre-state so racing transitions cannot both
        // commit; the loser matches zero rows.
        let row = sqlx::query_as::<_, Advisory>(
            r#"
            UPDATE advisories
            SET status = $3,
                response_message = COALESCE($4, response_message),
                updated_at = $5
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(next)
        .bind(response_message)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_for_programmer(
        &self,
        programmer_id: Uuid,
        status: Option<AdvisoryStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Advisory>, DatabaseError> {
        let rows = sqlx::query_as::<_, Advisory>(
            r#"
            SELECT * FROM advisories
            WHERE programmer_id = $1
              AND ($2 IS NULL OR status = $2)
            ORDER BY scheduled_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(programmer_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_for_external(
        &self,
        external_id: Uuid,
        status: Option<AdvisoryStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Advisory>, DatabaseError> {
        let rows = sqlx::query_as::<_, Advisory>(
            r#"
            SELECT * FROM advisories
            WHERE external_id = $1
              AND ($2 IS NULL OR status = $2)
            ORDER BY scheduled_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(external_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn approved_between(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<Advisory>, DatabaseError> {
        let rows = sqlx::query_as::<_, Advisory>(
            r#"
            SELECT * FROM advisories
            WHERE status = 'approved'
              AND scheduled_at >= $1
              AND scheduled_at < $2
            ORDER BY scheduled_at
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
