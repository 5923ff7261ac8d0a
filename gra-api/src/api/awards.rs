//! Award interval endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::services::AwardIntervalResult;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /awards/intervals
///
/// Producers with the shortest and longest gap between consecutive wins.
/// Served from the cache when populated; a store failure is a 500, never an
/// empty result.
pub async fn get_award_intervals(
    State(state): State<AppState>,
) -> ApiResult<Json<AwardIntervalResult>> {
    let result = state.engine.get_award_intervals().await?;
    Ok(Json(result.as_ref().clone()))
}

/// POST /awards/invalidate-cache
pub async fn invalidate_cache(State(state): State<AppState>) -> Json<MessageResponse> {
    state.engine.invalidate().await;
    Json(MessageResponse {
        message: "Award interval cache invalidated".to_string(),
    })
}

pub fn award_routes() -> Router<AppState> {
    Router::new()
        .route("/awards/intervals", get(get_award_intervals))
        .route("/awards/invalidate-cache", post(invalidate_cache))
}
