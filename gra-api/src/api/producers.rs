//! Producer endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use gra_common::db::{producers, Producer};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NewProducer {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProducerListResponse {
    pub producers: Vec<Producer>,
}

/// POST /producers
///
/// A producer credited on nothing cannot move the award intervals, so
/// creation leaves the cache alone.
pub async fn create_producer(
    State(state): State<AppState>,
    Json(body): Json<NewProducer>,
) -> ApiResult<(StatusCode, Json<Producer>)> {
    let (producer, created) = producers::create_producer(&state.db, &body.name).await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(producer)))
}

/// GET /producers
pub async fn list_producers(State(state): State<AppState>) -> ApiResult<Json<ProducerListResponse>> {
    let producers = producers::list_producers(&state.db).await?;
    Ok(Json(ProducerListResponse { producers }))
}

/// GET /producers/:id
pub async fn get_producer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Producer>> {
    producers::get_producer(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Producer {} not found", id)))
}

/// GET /producers/name/:name
pub async fn get_producer_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Producer>> {
    producers::get_producer_by_name(&state.db, &name)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Producer '{}' not found", name)))
}

/// DELETE /producers/:id
///
/// Removes the producer's credits too, so the award cache is invalidated.
pub async fn delete_producer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !producers::delete_producer(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Producer {} not found", id)));
    }

    state.engine.invalidate().await;
    Ok(StatusCode::NO_CONTENT)
}

pub fn producer_routes() -> Router<AppState> {
    Router::new()
        .route("/producers", get(list_producers).post(create_producer))
        .route("/producers/:id", get(get_producer).delete(delete_producer))
        .route("/producers/name/:name", get(get_producer_by_name))
}
