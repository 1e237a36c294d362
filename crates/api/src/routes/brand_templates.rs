use axum::routing::{get, post};
use axum::Router;

use crate::handlers::brand_templates;
use crate::state::AppState;

/// Routes mounted at `/brand-templates`.
///
/// ```text
/// GET  /              -> list_templates (?query, ?dataset=any|non_empty)
/// POST /open          -> open_templates
/// GET  /{id}          -> get_template
/// GET  /{id}/fields   -> get_template_fields
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(brand_templates::list_templates))
        .route("/open", post(brand_templates::open_templates))
        .route("/{id}", get(brand_templates::get_template))
        .route("/{id}/fields", get(brand_templates::get_template_fields))
}
