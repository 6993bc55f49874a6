use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::{Advisory, AdvisoryAction, AdvisoryListParams, NewAdvisory, Role};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

pub async fn create_advisory(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewAdvisory>,
) -> AppResult<(StatusCode, Json<Advisory>)> {
    if auth.role != Role::External {
        return Err(AppError::Authorization(
            "Only external users can request advisories".to_string(),
        ));
    }
    body.validate()?;
    let advisory = state.advisories.create(auth.id, &body).await?;
    Ok((StatusCode::CREATED, Json(advisory)))
}

/// Own advisories: the programmer side for providers, the requester side for
/// everyone else.
pub async fn list_advisories(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<AdvisoryListParams>,
) -> AppResult<Json<Vec<Advisory>>> {
    let advisories = match auth.role {
        Role::Programmer => state.advisories.list_for_programmer(auth.id, &params).await?,
        _ => state.advisories.list_for_external(auth.id, &params).await?,
    };
    Ok(Json(advisories))
}

pub async fn get_advisory(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Advisory>> {
    Ok(Json(state.advisories.find(id).await?))
}

pub async fn approve_advisory(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AdvisoryAction>,
) -> AppResult<Json<Advisory>> {
    body.validate()?;
    Ok(Json(state.advisories.approve(id, auth.id, &body).await?))
}

pub async fn reject_advisory(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AdvisoryAction>,
) -> AppResult<Json<Advisory>> {
    body.validate()?;
    Ok(Json(state.advisories.reject(id, auth.id, &body).await?))
}

pub async fn cancel_advisory(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Advisory>> {
    Ok(Json(state.advisories.cancel(id, auth.id).await?))
}

pub async fn complete_advisory(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Advisory>> {
    Ok(Json(state.advisories.complete(id, auth.id).await?))
}
