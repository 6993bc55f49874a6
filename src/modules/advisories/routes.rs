use axum::{
    routing::{get, post},
    Router,
};

use crate::app_state::AppState;

use super::handlers::{
    approve_advisory, cancel_advisory, complete_advisory, create_advisory, get_advisory,
    list_advisories, reject_advisory,
};

pub fn advisory_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_advisory).get(list_advisories))
        .route("/:id", get(get_advisory))
        .route("/:id/approve", post(approve_advisory))
        .route("/:id/reject", post(reject_advisory))
        .route("/:id/cancel", post(cancel_advisory))
        .route("/:id/complete", post(complete_advisory))
}
