//! Handlers for brand templates and opening them in the editor.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use shopfront_canva::models::DatasetFilter;
use shopfront_core::correlation::{CorrelationState, OriginPage};
use shopfront_core::dataset::TemplateField;
use shopfront_core::field_mapping::{suggest_mappings, MappingDraft};
use shopfront_pipeline::templates::ListOptions;
use validator::Validate;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListTemplatesParams {
    pub query: Option<String>,
    pub dataset: Option<DatasetFilter>,
}

/// Template fields plus a name-based guess at how to fill each one.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateFieldsResponse {
    pub fields: Vec<TemplateField>,
    pub suggested_mappings: Vec<MappingDraft>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OpenTemplatesRequest {
    #[validate(length(min = 1, max = 20))]
    pub template_ids: Vec<String>,
    pub correlation_state: Option<CorrelationState>,
}

/// GET /brand-templates
pub async fn list_templates(
    State(state): State<AppState>,
    Query(params): Query<ListTemplatesParams>,
) -> AppResult<impl IntoResponse> {
    let gateway = state.gateway(state.platform().await?);
    let templates = gateway
        .list(&ListOptions {
            query: params.query.filter(|q| !q.trim().is_empty()),
            dataset_filter: params.dataset,
        })
        .await?;
    tracing::debug!(count = templates.len(), "Listed brand templates");
    Ok(Json(DataResponse { data: templates }))
}

/// GET /brand-templates/{id}
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let template = state.gateway(state.platform().await?).get(&id).await?;
    Ok(Json(DataResponse { data: template }))
}

/// GET /brand-templates/{id}/fields
pub async fn get_template_fields(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let fields = state
        .orchestrator(state.platform().await?)
        .template_fields(&id)
        .await?;
    let suggested_mappings = suggest_mappings(&fields);
    Ok(Json(DataResponse {
        data: TemplateFieldsResponse {
            fields,
            suggested_mappings,
        },
    }))
}

/// POST /brand-templates/open
///
/// Builds (and, when enabled, opens) one editor URL per template. Each
/// template succeeds or fails on its own.
pub async fn open_templates(
    State(state): State<AppState>,
    Json(input): Json<OpenTemplatesRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let correlation = input.correlation_state.unwrap_or_else(|| CorrelationState {
        selected_templates: Some(input.template_ids.clone()),
        ..CorrelationState::new(OriginPage::BrandTemplateCreator)
    });

    let launches = state
        .gateway(state.platform().await?)
        .open_templates_for_editing(&input.template_ids, &correlation)
        .await;
    Ok(Json(DataResponse { data: launches }))
}
