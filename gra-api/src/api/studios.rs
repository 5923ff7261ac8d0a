//! Studio endpoints
//!
//! Studios play no part in award intervals; none of these touch the cache.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use gra_common::db::{studios, Studio};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NewStudio {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudioListResponse {
    pub studios: Vec<Studio>,
}

pub async fn create_studio(
    State(state): State<AppState>,
    Json(body): Json<NewStudio>,
) -> ApiResult<(StatusCode, Json<Studio>)> {
    let (studio, created) = studios::create_studio(&state.db, &body.name).await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(studio)))
}

pub async fn list_studios(State(state): State<AppState>) -> ApiResult<Json<StudioListResponse>> {
    let studios = studios::list_studios(&state.db).await?;
    Ok(Json(StudioListResponse { studios }))
}

pub async fn get_studio(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Studio>> {
    studios::get_studio(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Studio {} not found", id)))
}

pub async fn get_studio_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Studio>> {
    studios::get_studio_by_name(&state.db, &name)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Studio '{}' not found", name)))
}

pub async fn delete_studio(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    if !studios::delete_studio(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Studio {} not found", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub fn studio_routes() -> Router<AppState> {
    Router::new()
        .route("/studios", get(list_studios).post(create_studio))
        .route("/studios/:id", get(get_studio).delete(delete_studio))
        .route("/studios/name/:name", get(get_studio_by_name))
}
