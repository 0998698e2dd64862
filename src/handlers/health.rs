//! Liveness and readiness endpoints. Liveness is unconditional;
//! readiness pings the database.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use crate::{db, AppState};

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "up",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn liveness() -> impl IntoResponse {
    Json(json!({ "status": "alive" }))
}

pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match db::check_connection(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ready", "database": "up" })),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not ready", "database": "down" })),
        ),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
}
