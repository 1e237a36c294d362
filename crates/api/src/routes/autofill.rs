//! Route definitions for autofill.
//!
//! `/batch` answers once every template has settled; `/batch/jobs` starts
//! the same work in the background and is polled by id.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::autofill;
use crate::state::AppState;

/// Routes mounted at `/autofill`.
///
/// ```text
/// POST   /product              -> autofill_product
/// POST   /mappings             -> autofill_mappings
/// POST   /batch                -> autofill_batch
/// POST   /batch/jobs           -> start_batch
/// GET    /batch/jobs/{id}      -> get_batch
/// DELETE /batch/jobs/{id}      -> cancel_batch
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/product", post(autofill::autofill_product))
        .route("/mappings", post(autofill::autofill_mappings))
        .route("/batch", post(autofill::autofill_batch))
        .route("/batch/jobs", post(autofill::start_batch))
        .route(
            "/batch/jobs/{id}",
            get(autofill::get_batch).delete(autofill::cancel_batch),
        )
}
