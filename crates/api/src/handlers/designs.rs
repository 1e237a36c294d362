//! Handlers for designs on the connected account.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use shopfront_canva::models::{DesignType, PresetName};
use shopfront_core::correlation::{CorrelationState, OriginPage};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListDesignsParams {
    pub continuation: Option<String>,
}

/// Blank design by default. With `productId` the product image is uploaded
/// first and the design is titled with `campaignName`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDesignInput {
    #[validate(length(max = 255))]
    pub title: Option<String>,
    pub design_type: Option<DesignType>,
    pub product_id: Option<i64>,
    #[validate(length(min = 1, max = 255))]
    pub campaign_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UploadDesignParams {
    pub name: String,
    #[validate(length(max = 255))]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditDesignInput {
    pub correlation_state: Option<CorrelationState>,
}

#[derive(Debug, Serialize)]
pub struct EditorUrl {
    pub url: String,
}

// ---------------------------------------------------------------------------
// GET /designs
// ---------------------------------------------------------------------------

pub async fn list_designs(
    State(state): State<AppState>,
    Query(params): Query<ListDesignsParams>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .designs(state.platform().await?)
        .list(params.continuation.as_deref())
        .await?;
    Ok(Json(DataResponse { data: page }))
}

// ---------------------------------------------------------------------------
// GET /designs/{id}
// ---------------------------------------------------------------------------

pub async fn get_design(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let design = state.designs(state.platform().await?).get(&id).await?;
    Ok(Json(DataResponse { data: design }))
}

// ---------------------------------------------------------------------------
// POST /designs
// ---------------------------------------------------------------------------

pub async fn create_design(
    State(state): State<AppState>,
    Json(input): Json<CreateDesignInput>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let service = state.designs(state.platform().await?);

    let design = match input.product_id {
        Some(product_id) => {
            let product = state.catalog.get(product_id)?;
            let campaign = input
                .campaign_name
                .or(input.title)
                .unwrap_or_else(|| product.name.clone());
            service
                .create_from_product(product, &campaign, &state.cancel_token())
                .await?
        }
        None => {
            let design_type = input.design_type.unwrap_or(DesignType::Preset {
                name: PresetName::Presentation,
            });
            service.create_blank(input.title, design_type).await?
        }
    };

    Ok((StatusCode::CREATED, Json(DataResponse { data: design })))
}

// ---------------------------------------------------------------------------
// POST /designs/upload?name=...&title=...
// ---------------------------------------------------------------------------

/// Upload the raw request body as an image, then create a design around it.
pub async fn create_design_from_upload(
    State(state): State<AppState>,
    Query(params): Query<UploadDesignParams>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    params.validate()?;
    let name = params.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Asset name must not be empty".to_string()));
    }
    if body.is_empty() {
        return Err(AppError::BadRequest("Upload body is empty".to_string()));
    }

    let design = state
        .designs(state.platform().await?)
        .create_from_upload(name, body.to_vec(), params.title, &state.cancel_token())
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: design })))
}

// ---------------------------------------------------------------------------
// POST /designs/edit
// ---------------------------------------------------------------------------

/// Create a blank design and hand back its editor URL, wired for return
/// navigation.
pub async fn edit_new_design(
    State(state): State<AppState>,
    Json(input): Json<EditDesignInput>,
) -> AppResult<impl IntoResponse> {
    let correlation = input
        .correlation_state
        .unwrap_or_else(|| CorrelationState::new(OriginPage::MarketingSingle));
    let url = state
        .gateway(state.platform().await?)
        .create_design_for_editing(&correlation)
        .await?;
    Ok(Json(DataResponse {
        data: EditorUrl { url },
    }))
}
