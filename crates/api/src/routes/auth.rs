//! Route definitions for the platform account connection.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// GET  /authorize   -> authorize
/// GET  /status      -> status
/// POST /revoke      -> revoke
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/authorize", get(auth::authorize))
        .route("/status", get(auth::status))
        .route("/revoke", post(auth::revoke))
}

/// Routes mounted at `/user`.
///
/// ```text
/// GET /profile   -> profile
/// ```
pub fn user_router() -> Router<AppState> {
    Router::new().route("/profile", get(auth::profile))
}
