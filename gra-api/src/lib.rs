//! gra-api library - Golden Raspberry Awards catalog service
//!
//! Stores movies, producers and studios, imports nominee lists from CSV, and
//! reports the producers with the shortest and longest gaps between wins.

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod services;

use services::AwardIntervalEngine;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Award interval engine; the only holder of the result cache
    pub engine: Arc<AwardIntervalEngine>,
    /// Environment label reported by /health
    pub environment: String,
    /// Set once any CSV import has completed
    pub csv_loaded: Arc<AtomicBool>,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state with an engine reading from `db`
    pub fn new(db: SqlitePool, environment: impl Into<String>) -> Self {
        let engine = Arc::new(AwardIntervalEngine::from_pool(db.clone()));
        Self {
            db,
            engine,
            environment: environment.into(),
            csv_loaded: Arc::new(AtomicBool::new(false)),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::movie_routes())
        .merge(api::producer_routes())
        .merge(api::studio_routes())
        .merge(api::award_routes())
        .merge(api::csv_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
