//! # REST API Interface Layer
//!
//! Each `*_apis` module exposes a `router()` that `create_router` nests
//! under `/api`. Handlers translate shared DTOs into domain commands, call
//! the service, and map results back; failures leave through `ApiError`.

pub mod health_apis;
pub mod mappers;
pub mod student_apis;

use axum::{
    http::{StatusCode, Uri},
    response::Json,
};
use shared::ErrorResponse;
use tracing::warn;

/// Fallback for paths no router claims
pub async fn route_not_found(uri: Uri) -> (StatusCode, Json<ErrorResponse>) {
    warn!("No route for {}", uri.path());
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            message: "Route not found".to_string(),
            error: None,
        }),
    )
}
