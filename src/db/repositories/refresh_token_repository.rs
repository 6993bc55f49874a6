use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::error::DatabaseError;
use crate::db::models::{NewRefreshToken, RefreshToken};
use crate::db::store::RefreshTokenStore;

pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for RefreshTokenRepository {
    async fn insert(&self, token: &NewRefreshToken) -> Result<RefreshToken, DatabaseError> {
        let row = sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO refresh_tokens (token, user_id, expires_at, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&token.token)
        .bind(token.user_id)
        .bind(token.expires_at)
        .bind(token.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, DatabaseError> {
        let row = sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn rotate(
        &self,
        old_id: Uuid,
        revoked_at: OffsetDateTime,
        successor: &NewRefreshToken,
    ) -> Result<RefreshToken, DatabaseError> {
        // Revocation and successor insertion commit together; a crash cannot
        // leave the caller with both tokens usable or neither.
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO refresh_tokens (token, user_id, expires_at, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&successor.token)
        .bind(successor.user_id)
        .bind(successor.expires_at)
        .bind(successor.created_at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = $2, replaced_by_token = $3 WHERE id = $1",
        )
        .bind(old_id)
        .bind(revoked_at)
        .bind(&successor.token)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn revoke(&self, id: Uuid, revoked_at: OffsetDateTime) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE refresh_tokens SET revoked_at = $2 WHERE id = $1")
            .bind(id)
            .bind(revoked_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        revoked_at: OffsetDateTime,
    ) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = $2 WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .bind(revoked_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
