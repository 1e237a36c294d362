use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{assets, designs};
use crate::state::AppState;

/// Routes mounted at `/designs`.
///
/// ```text
/// GET  /        -> list_designs (?continuation)
/// POST /        -> create_design
/// POST /upload  -> create_design_from_upload (?name, ?title, raw image body)
/// POST /edit    -> edit_new_design
/// GET  /{id}    -> get_design
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(designs::list_designs).post(designs::create_design))
        .route(
            "/upload",
            post(designs::create_design_from_upload)
                .layer(DefaultBodyLimit::max(assets::MAX_UPLOAD_BYTES)),
        )
        .route("/edit", post(designs::edit_new_design))
        .route("/{id}", get(designs::get_design))
}
