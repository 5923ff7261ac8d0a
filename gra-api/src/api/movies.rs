//! Movie catalog endpoints
//!
//! Writes that change the catalog invalidate the award interval cache.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use gra_common::db::{movies, Expand, Movie, MovieDetail, NewMovie};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Query parameters for listing movies
#[derive(Debug, Default, Deserialize)]
pub struct MovieListQuery {
    /// Comma-separated relations to attach (`producers`, `studios`)
    pub expand: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MovieListResponse {
    pub movies: Vec<MovieDetail>,
}

/// POST /movies
///
/// 201 with the new movie, or 200 with the stored one when the title exists.
pub async fn create_movie(
    State(state): State<AppState>,
    Json(new_movie): Json<NewMovie>,
) -> ApiResult<(StatusCode, Json<Movie>)> {
    let (movie, created) = movies::create_movie(&state.db, &new_movie).await?;

    if created {
        state.engine.invalidate().await;
        Ok((StatusCode::CREATED, Json(movie)))
    } else {
        Ok((StatusCode::OK, Json(movie)))
    }
}

/// GET /movies
pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<MovieListQuery>,
) -> ApiResult<Json<MovieListResponse>> {
    let expand = query
        .expand
        .as_deref()
        .map(Expand::from_list)
        .unwrap_or_default();

    let movies = movies::list_movies_expanded(&state.db, expand).await?;
    Ok(Json(MovieListResponse { movies }))
}

/// GET /movies/:id
pub async fn get_movie(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Movie>> {
    movies::get_movie(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Movie {} not found", id)))
}

/// GET /movies/title/:title
pub async fn get_movie_by_title(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> ApiResult<Json<Movie>> {
    movies::get_movie_by_title(&state.db, &title)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Movie '{}' not found", title)))
}

/// DELETE /movies/:id
pub async fn delete_movie(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    if !movies::delete_movie(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Movie {} not found", id)));
    }

    state.engine.invalidate().await;
    Ok(StatusCode::NO_CONTENT)
}

pub fn movie_routes() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/:id", get(get_movie).delete(delete_movie))
        .route("/movies/title/:title", get(get_movie_by_title))
}
