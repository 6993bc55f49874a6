use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::UserSummary;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;

use super::service::SessionTokens;

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token must not be empty"))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserSummary,
}

impl AuthResponse {
    fn new(tokens: SessionTokens, user: UserSummary) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
            user,
        }
    }
}

/// Exchange a refresh token for a new access token; the presented refresh
/// token is consumed and its successor returned.
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> AppResult<Json<AuthResponse>> {
    body.validate()?;
    let (tokens, user) = state.tokens.refresh_session(&body.refresh_token).await?;
    info!("Refreshed session for user: {}", user.email);
    Ok(Json(AuthResponse::new(tokens, UserSummary::from(&user))))
}

pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> AppResult<StatusCode> {
    body.validate()?;
    state.tokens.revoke(&body.refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mass invalidation for the authenticated user, e.g. after a suspected
/// token compromise. Every live refresh token of the caller is revoked.
pub async fn logout_all(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<StatusCode> {
    state.tokens.revoke_all_for_user(auth.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
