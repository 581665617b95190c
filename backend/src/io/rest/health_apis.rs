use axum::{response::Json, routing::get, Router};
use tracing::info;

use crate::AppState;
use shared::HealthResponse;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Liveness probe; needs no token and touches no storage
pub async fn health_check() -> Json<HealthResponse> {
    info!("GET /api/health");
    Json(HealthResponse {
        message: "Server is running".to_string(),
    })
}
