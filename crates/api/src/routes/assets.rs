use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::assets;
use crate::state::AppState;

/// Routes mounted at `/assets`.
///
/// ```text
/// POST /          -> upload_asset (?name, raw image body)
/// GET  /recent    -> recent_assets
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(assets::upload_asset).layer(DefaultBodyLimit::max(assets::MAX_UPLOAD_BYTES)),
        )
        .route("/recent", get(assets::recent_assets))
}
