use axum::{
    routing::{get, put},
    Router,
};

use crate::app_state::AppState;

use super::handlers::{
    create_availability, delete_availability, list_own_availability, list_user_availability,
    update_availability,
};

pub fn availability_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_own_availability).post(create_availability))
        .route("/:id", put(update_availability).delete(delete_availability))
        .route("/users/:user_id", get(list_user_availability))
}
