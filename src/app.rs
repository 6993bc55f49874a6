use axum::{middleware, routing::get, Json, Router};
use serde_json::json;

use crate::{
    app_state::AppState,
    middleware::tracing::request_tracing_middleware,
    modules::{
        advisories::advisory_routes, auth::auth_routes, availability::availability_routes,
    },
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes())
        .nest("/api/advisories", advisory_routes())
        .nest("/api/availability", availability_routes())
        .layer(middleware::from_fn(request_tracing_middleware))
        .with_state(state)
}

async fn hello() -> &'static str {
    "Advisory Backend says hello!\n"
}

async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    let db_result = sqlx::query("SELECT 1").execute(&state.db).await;

    let db_status = match db_result {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::info!("Database health check failed: {}", e);
            "unhealthy"
        }
    };

    Json(json!({
        "status": "ok",
        "service": state.env.app.name,
        "timestamp": time::OffsetDateTime::now_utc().to_string(),
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "database": db_status,
        }
    }))
}
