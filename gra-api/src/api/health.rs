//! Health check and root endpoints

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::Ordering;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub api_status: String,
    pub module: String,
    pub version: String,
    pub environment: String,
    /// Whether any CSV import has completed since startup
    pub csv_loaded: bool,
    pub database_status: String,
    pub uptime_seconds: i64,
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
}

/// GET /health
///
/// Always 200; a dead database shows up as `database_status: "disconnected"`.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_status = if gra_common::db::ping(&state.db).await {
        "connected"
    } else {
        "disconnected"
    };

    Json(HealthResponse {
        api_status: "running".to_string(),
        module: "gra-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.environment.clone(),
        csv_loaded: state.csv_loaded.load(Ordering::SeqCst),
        database_status: database_status.to_string(),
        uptime_seconds: (Utc::now() - state.startup_time).num_seconds(),
    })
}

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Golden Raspberry Awards API is running!".to_string(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
}
