//! Handlers for autofill: single template (product or mappings) and
//! multi-template batches, synchronous or as tracked background runs.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use shopfront_core::error::CoreError;
use shopfront_core::field_mapping::{FieldMapping, MappingDraft};
use shopfront_core::library::SavedDesign;
use shopfront_pipeline::batch::{lookup_and_merge, BatchRequest, BatchTemplate};
use shopfront_pipeline::progress::ProgressTracker;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductAutofillRequest {
    #[validate(length(min = 1))]
    pub brand_template_id: String,
    pub product_id: i64,
    #[validate(length(min = 1, max = 50))]
    pub discount: String,
    pub title: Option<String>,
}

/// Either concrete `mappings`, or `drafts` resolved against an optional
/// product and discount.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MappingAutofillRequest {
    #[validate(length(min = 1))]
    pub brand_template_id: String,
    #[serde(default)]
    pub mappings: Vec<FieldMapping>,
    #[serde(default)]
    pub drafts: Vec<MappingDraft>,
    pub product_id: Option<i64>,
    #[serde(default)]
    pub discount: String,
    pub title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TemplateSelection {
    #[validate(length(min = 1))]
    pub id: String,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BatchAutofillRequest {
    #[validate(length(min = 1, max = 20), nested)]
    pub templates: Vec<TemplateSelection>,
    pub product_id: i64,
    #[validate(length(min = 1, max = 50))]
    pub discount: String,
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchStarted {
    pub id: Uuid,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Remember a design produced by a single autofill.
fn save_to_library(state: &AppState, design: &SavedDesign) {
    if let Err(e) = state.library.save(design.clone()) {
        tracing::warn!(design_id = %design.id, error = %e, "Failed to save design to library");
    }
}

fn batch_request(state: &AppState, input: BatchAutofillRequest) -> AppResult<BatchRequest> {
    let product = state.catalog.get(input.product_id)?.clone();
    Ok(BatchRequest {
        templates: input
            .templates
            .into_iter()
            .map(|t| BatchTemplate {
                id: t.id,
                title: t.title,
            })
            .collect(),
        product,
        discount: input.discount,
        title: input.title,
    })
}

// ---------------------------------------------------------------------------
// POST /autofill/product
// ---------------------------------------------------------------------------

pub async fn autofill_product(
    State(state): State<AppState>,
    Json(input): Json<ProductAutofillRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let product = state.catalog.get(input.product_id)?.clone();

    let platform = state.platform().await?;
    let job_design = state
        .orchestrator(platform.clone())
        .autofill_product(
            &input.brand_template_id,
            &product,
            &input.discount,
            input.title,
            &state.cancel_token(),
        )
        .await?;
    let design = lookup_and_merge(platform.as_ref(), &job_design).await?;
    save_to_library(&state, &design);

    tracing::info!(design_id = %design.id, template_id = %input.brand_template_id, "Product autofill finished");
    Ok((StatusCode::CREATED, Json(DataResponse { data: design })))
}

// ---------------------------------------------------------------------------
// POST /autofill/mappings
// ---------------------------------------------------------------------------

pub async fn autofill_mappings(
    State(state): State<AppState>,
    Json(input): Json<MappingAutofillRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    if input.mappings.is_empty() == input.drafts.is_empty() {
        return Err(AppError::BadRequest(
            "Provide either mappings or drafts".to_string(),
        ));
    }

    let platform = state.platform().await?;
    let orchestrator = state.orchestrator(platform.clone());
    let cancel = state.cancel_token();

    let mappings = if input.drafts.is_empty() {
        input.mappings
    } else {
        let product = input
            .product_id
            .map(|id| state.catalog.get(id).cloned())
            .transpose()?;
        orchestrator
            .resolve_mappings(&input.drafts, product.as_ref(), &input.discount, &cancel)
            .await?
    };

    let job_design = orchestrator
        .autofill_mappings(&input.brand_template_id, &mappings, input.title, &cancel)
        .await?;
    let design = lookup_and_merge(platform.as_ref(), &job_design).await?;
    save_to_library(&state, &design);

    Ok((StatusCode::CREATED, Json(DataResponse { data: design })))
}

// ---------------------------------------------------------------------------
// POST /autofill/batch
// ---------------------------------------------------------------------------

/// Run a batch and answer with the settled report.
pub async fn autofill_batch(
    State(state): State<AppState>,
    Json(input): Json<BatchAutofillRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let request = batch_request(&state, input)?;

    let batch = state.batch(state.platform().await?);
    let report = batch
        .run(&request, &mut ProgressTracker::new(), &state.cancel_token())
        .await;
    Ok(Json(DataResponse { data: report }))
}

// ---------------------------------------------------------------------------
// POST /autofill/batch/jobs
// ---------------------------------------------------------------------------

/// Start a batch in the background; poll it by id.
pub async fn start_batch(
    State(state): State<AppState>,
    Json(input): Json<BatchAutofillRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let request = batch_request(&state, input)?;

    let batch = state.batch(state.platform().await?);
    let id = state
        .batches
        .start(batch, request, state.cancel_token())
        .await;
    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: BatchStarted { id },
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /autofill/batch/jobs/{id}
// ---------------------------------------------------------------------------

pub async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let view = state.batches.get(id).await.ok_or_else(|| CoreError::NotFound {
        entity: "BatchRun",
        id: id.to_string(),
    })?;
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// DELETE /autofill/batch/jobs/{id}
// ---------------------------------------------------------------------------

pub async fn cancel_batch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !state.batches.cancel(id).await {
        return Err(CoreError::NotFound {
            entity: "BatchRun",
            id: id.to_string(),
        }
        .into());
    }
    Ok(StatusCode::ACCEPTED)
}
