//! Handlers for image uploads.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub name: String,
}

// ---------------------------------------------------------------------------
// POST /assets?name=...
// ---------------------------------------------------------------------------

/// Upload the raw request body as an image asset and wait for it to settle.
pub async fn upload_asset(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let name = params.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Asset name must not be empty".to_string()));
    }
    if body.is_empty() {
        return Err(AppError::BadRequest("Upload body is empty".to_string()));
    }

    let asset = state
        .uploader(state.platform().await?)
        .upload_bytes(name, body.to_vec(), &state.cancel_token())
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: asset })))
}

// ---------------------------------------------------------------------------
// GET /assets/recent
// ---------------------------------------------------------------------------

pub async fn recent_assets(State(state): State<AppState>) -> impl IntoResponse {
    Json(DataResponse {
        data: state.recent_assets.load_all(),
    })
}
