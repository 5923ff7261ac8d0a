//! CSV upload endpoint

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use std::sync::atomic::Ordering;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::services::{csv_importer, ImportSummary};
use crate::AppState;

/// POST /csv/upload
///
/// Multipart form with a `file` field holding a `.csv` file encoded as UTF-8.
pub async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<ImportSummary>> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(|s| s.to_string()).unwrap_or_default();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read uploaded file: {}", e)))?;
        upload = Some((file_name, bytes.to_vec()));
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest("Missing 'file' field".to_string()))?;

    if !file_name.ends_with(".csv") {
        return Err(ApiError::BadRequest("File must be a CSV".to_string()));
    }

    let content = String::from_utf8(bytes)
        .map_err(|_| ApiError::BadRequest("File must be UTF-8 encoded".to_string()))?;

    info!(file = %file_name, size = content.len(), "CSV upload received");

    let summary = csv_importer::import_csv(&state.db, &state.engine, &content).await?;
    state.csv_loaded.store(true, Ordering::SeqCst);

    Ok(Json(summary))
}

pub fn csv_routes() -> Router<AppState> {
    Router::new().route("/csv/upload", post(upload_csv))
}
