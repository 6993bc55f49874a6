use std::sync::Arc;

use serde::Serialize;
use time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::clock::Clock;
use crate::db::{NewRefreshToken, RefreshToken, RefreshTokenStore, User, UserStore};
use crate::error::{AppError, AppResult};

use super::jwt::JwtService;

#[derive(Debug, Serialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Session authority: stateless access tokens plus rotating single-use
/// refresh tokens with revocation tracking.
pub struct TokenService {
    tokens: Arc<dyn RefreshTokenStore>,
    users: Arc<dyn UserStore>,
    jwt: Arc<JwtService>,
    refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(
        tokens: Arc<dyn RefreshTokenStore>,
        users: Arc<dyn UserStore>,
        jwt: Arc<JwtService>,
        refresh_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tokens,
            users,
            jwt,
            refresh_ttl,
            clock,
        }
    }

    /// Access token + fresh refresh token, the pair handed out at login and
    /// on every refresh. The login boundary (identity verification lives
    /// outside this service) calls this once a user is resolved.
    #[allow(unused)]
    pub async fn issue_session(&self, user: &User) -> AppResult<SessionTokens> {
        let access_token = self.jwt.issue(user)?;
        let refresh = self.create_refresh_token(user).await?;
        Ok(SessionTokens {
            access_token,
            refresh_token: refresh.token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.ttl_secs(),
        })
    }

    pub async fn create_refresh_token(&self, user: &User) -> AppResult<RefreshToken> {
        let now = self.clock.now();
        let token = NewRefreshToken {
            token: Uuid::new_v4().to_string(),
            user_id: user.id,
            expires_at: now + self.refresh_ttl,
            created_at: now,
        };
        let saved = self.tokens.insert(&token).await?;
        info!("Created refresh token for user: {}", user.email);
        Ok(saved)
    }

    pub async fn validate_refresh_token(&self, value: &str) -> AppResult<(RefreshToken, User)> {
        let token = self
            .tokens
            .find_by_token(value)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if token.is_revoked() {
            return Err(AppError::RevokedToken);
        }
        if token.is_expired(self.clock.now()) {
            return Err(AppError::ExpiredToken);
        }

        let user = self
            .users
            .find(token.user_id)
            .await?
            .ok_or(AppError::InvalidToken)?;
        Ok((token, user))
    }

    /// Revokes `old` and hands out its successor in one atomic step,
    /// recording the chain link. The old token fails validation from here on.
    pub async fn rotate_refresh_token(&self, old: &RefreshToken) -> AppResult<RefreshToken> {
        let now = self.clock.now();
        let successor = NewRefreshToken {
            token: Uuid::new_v4().to_string(),
            user_id: old.user_id,
            expires_at: now + self.refresh_ttl,
            created_at: now,
        };
        Ok(self.tokens.rotate(old.id, now, &successor).await?)
    }

    /// Full refresh exchange: validate, mint a new access token, rotate.
    pub async fn refresh_session(&self, value: &str) -> AppResult<(SessionTokens, User)> {
        let (old, user) = self.validate_refresh_token(value).await?;
        let access_token = self.jwt.issue(&user)?;
        let rotated = self.rotate_refresh_token(&old).await?;
        Ok((
            SessionTokens {
                access_token,
                refresh_token: rotated.token,
                token_type: "Bearer".to_string(),
                expires_in: self.jwt.ttl_secs(),
            },
            user,
        ))
    }

    pub async fn revoke(&self, value: &str) -> AppResult<()> {
        let token = self
            .tokens
            .find_by_token(value)
            .await?
            .ok_or(AppError::InvalidToken)?;
        self.tokens.revoke(token.id, self.clock.now()).await?;
        Ok(())
    }

    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let revoked = self
            .tokens
            .revoke_all_for_user(user_id, self.clock.now())
            .await?;
        info!("Revoked {} refresh tokens for user {}", revoked, user_id);
        Ok(revoked)
    }
}
