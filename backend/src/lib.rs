//! # Attendance Backend
//!
//! REST backend for tracking student attendance, one roster per account.
//!
//! The crate follows a layered architecture:
//! ```text
//! IO Layer (REST API, bearer-token auth)
//!     ↓
//! Domain Layer (StudentService, attendance rules, aggregates)
//!     ↓
//! Storage Layer (SQLite via sqlx)
//! ```
//!
//! `initialize_backend` wires the layers into an `AppState`, and
//! `create_router` exposes it as an axum `Router` with CORS configured.

pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{http::Method, middleware, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{AttendanceCalendar, StudentService};
use crate::error::AttendanceError;
use crate::io::rest::{health_apis, route_not_found, student_apis};
use crate::io::{auth, ApiError, HmacTokenVerifier, TokenVerifier};
use crate::storage::{DbConnection, StudentRepository};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub student_service: StudentService,
    pub token_verifier: Arc<dyn TokenVerifier>,
    /// Whether 500 responses carry the internal error chain
    pub expose_error_details: bool,
}

impl AppState {
    pub fn new(db_conn: DbConnection, config: &AppConfig) -> Result<Self> {
        let storage = Arc::new(StudentRepository::new(db_conn));
        let calendar = AttendanceCalendar::new(config.utc_offset);

        Ok(Self {
            student_service: StudentService::new(storage, calendar),
            token_verifier: Arc::new(HmacTokenVerifier::new(&config.token_secret)?),
            expose_error_details: config.expose_error_details(),
        })
    }

    /// Wrap a domain error for the response, honouring the detail setting
    pub fn reject(&self, error: AttendanceError) -> ApiError {
        ApiError::new(error, self.expose_error_details)
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db_conn = DbConnection::new(&config.database_url).await?;

    info!("Setting up application state");
    AppState::new(db_conn, config)
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &AppConfig) -> Router {
    let cors = match &config.cors_origin {
        Some(origin) => CorsLayer::new().allow_origin(origin.clone()),
        None => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
    .allow_headers(Any);

    let student_routes = student_apis::router().route_layer(middleware::from_fn_with_state(
        app_state.clone(),
        auth::require_account,
    ));

    let api_routes = Router::new()
        .nest("/students", student_routes)
        .merge(health_apis::router());

    Router::new()
        .nest("/api", api_routes)
        .fallback(route_not_found)
        .layer(cors)
        .with_state(app_state)
}
