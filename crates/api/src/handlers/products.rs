//! Handlers for the demo product catalog.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /products
pub async fn list_products(State(state): State<AppState>) -> impl IntoResponse {
    Json(DataResponse {
        data: state.catalog.all().to_vec(),
    })
}

/// GET /products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let product = state.catalog.get(id)?.clone();
    Ok(Json(DataResponse { data: product }))
}
