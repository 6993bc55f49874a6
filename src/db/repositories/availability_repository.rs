use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::error::DatabaseError;
use crate::db::models::{
    AvailabilityWindow, DayOfWeek, NewAvailabilityWindow, UpdateAvailabilityWindow,
};
use crate::db::store::AvailabilityStore;

pub struct AvailabilityRepository {
    pool: PgPool,
}

impl AvailabilityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AvailabilityStore for AvailabilityRepository {
    async fn insert(
        &self,
        owner_id: Uuid,
        window: &NewAvailabilityWindow,
        created_at: OffsetDateTime,
    ) -> Result<AvailabilityWindow, DatabaseError> {
        let row = sqlx::query_as::<_, AvailabilityWindow>(
            r#"
            INSERT INTO availability (user_id, day_of_week, start_time, end_time, is_active, created_at)
            VALUES ($1, $2, $3, $4, TRUE, $5)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(window.day_of_week)
        .bind(window.start_time)
        .bind(window.end_time)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find(&self, id: Uuid) -> Result<Option<AvailabilityWindow>, DatabaseError> {
        let row = sqlx::query_as::<_, AvailabilityWindow>("SELECT * FROM availability WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        window: &UpdateAvailabilityWindow,
    ) -> Result<Option<AvailabilityWindow>, DatabaseError> {
        let row = sqlx::query_as::<_, AvailabilityWindow>(
            r#"
            UPDATE availability
            SET day_of_week = $2, start_time = $3, end_time = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(window.day_of_week)
        .bind(window.start_time)
        .bind(window.end_time)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn deactivate(&self, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE availability SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn active_for_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<AvailabilityWindow>, DatabaseError> {
        let rows = sqlx::query_as::<_, AvailabilityWindow>(
            r#"
            SELECT * FROM availability
            WHERE user_id = $1 AND is_active
            ORDER BY day_of_week, start_time
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn active_for_owner_on(
        &self,
        owner_id: Uuid,
        day: DayOfWeek,
    ) -> Result<Vec<AvailabilityWindow>, DatabaseError> {
        let rows = sqlx::query_as::<_, AvailabilityWindow>(
            r#"
            SELECT * FROM availability
            WHERE user_id = $1 AND day_of_week = $2 AND is_active
            ORDER BY start_time
            "#,
        )
        .bind(owner_id)
        .bind(day)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
