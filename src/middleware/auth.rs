use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::Role;
use crate::error::AppError;

/// Caller identity resolved from a Bearer access token. Handlers pass the
/// id explicitly into the services; nothing downstream reads ambient state.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::InvalidToken)?;
        let token = header.strip_prefix("Bearer ").ok_or(AppError::InvalidToken)?;

        let claims = state.jwt.verify(token)?;
        let id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;

        Ok(AuthUser {
            id,
            email: claims.email,
            role: claims.role,
        })
    }
}
