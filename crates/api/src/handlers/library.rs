//! Handlers for the locally remembered content library.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /library
pub async fn list_library(State(state): State<AppState>) -> impl IntoResponse {
    Json(DataResponse {
        data: state.library.load_all(),
    })
}

/// DELETE /library
pub async fn clear_library(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.library.clear()?;
    tracing::info!("Content library cleared");
    Ok(StatusCode::NO_CONTENT)
}
