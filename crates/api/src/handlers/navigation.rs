//! Return navigation from the external editor.

use axum::extract::{Query, State};
use axum::response::Redirect;
use reqwest::Url;
use serde::Deserialize;
use shopfront_core::correlation::CorrelationState;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReturnNavParams {
    pub design_id: Option<String>,
    pub correlation_state: Option<String>,
}

/// GET /return-nav
///
/// Sends the browser back to the front-end page the user left from. The
/// encoded correlation state is passed through untouched so the page can
/// restore its selection; `design_id` and the origin product are added as
/// plain parameters.
pub async fn return_nav(
    State(state): State<AppState>,
    Query(params): Query<ReturnNavParams>,
) -> AppResult<Redirect> {
    let decoded = params
        .correlation_state
        .as_deref()
        .map(CorrelationState::decode)
        .transpose()?;

    let path = decoded.as_ref().map_or("/", |s| s.origin_page.path());
    let mut url = Url::parse(&state.config.frontend_url)
        .and_then(|base| base.join(path))
        .map_err(|e| AppError::InternalError(format!("Invalid FRONTEND_URL: {e}")))?;

    let mut pairs: Vec<(&str, String)> = Vec::new();
    if let Some(design_id) = &params.design_id {
        pairs.push(("design_id", design_id.clone()));
    }
    if let Some(product_id) = decoded.as_ref().and_then(|s| s.origin_product_id) {
        pairs.push(("product_id", product_id.to_string()));
    }
    if let Some(encoded) = &params.correlation_state {
        pairs.push(("correlation_state", encoded.clone()));
    }
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }

    tracing::info!(
        design_id = params.design_id.as_deref().unwrap_or(""),
        target = %url,
        "Returning from editor"
    );
    Ok(Redirect::to(url.as_str()))
}
