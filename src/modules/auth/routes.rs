use axum::{routing::post, Router};

use crate::app_state::AppState;

use super::handlers::{logout, logout_all, refresh};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/logout-all", post(logout_all))
}
