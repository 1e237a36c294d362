use axum::routing::get;
use axum::Router;

use crate::handlers::library;
use crate::state::AppState;

/// Routes mounted at `/library`.
///
/// ```text
/// GET    /   -> list_library
/// DELETE /   -> clear_library
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(library::list_library).delete(library::clear_library))
}
