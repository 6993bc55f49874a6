use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::{AvailabilityWindow, NewAvailabilityWindow, UpdateAvailabilityWindow};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;

pub async fn list_own_availability(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<AvailabilityWindow>>> {
    Ok(Json(state.availability.windows_for(auth.id).await?))
}

/// A provider's published windows, visible to any authenticated caller so
/// requesters can pick a slot.
pub async fn list_user_availability(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<AvailabilityWindow>>> {
    Ok(Json(state.availability.windows_for(user_id).await?))
}

pub async fn create_availability(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewAvailabilityWindow>,
) -> AppResult<(StatusCode, Json<AvailabilityWindow>)> {
    body.validate()?;
    let window = state.availability.create(auth.id, &body).await?;
    Ok((StatusCode::CREATED, Json(window)))
}

pub async fn update_availability(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateAvailabilityWindow>,
) -> AppResult<Json<AvailabilityWindow>> {
    body.validate()?;
    Ok(Json(state.availability.update(id, auth.id, &body).await?))
}

pub async fn delete_availability(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.availability.deactivate(id, auth.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
