//! Browser-facing callbacks registered with the design platform. These
//! live at the root because their URLs are configured on the platform side.
//!
//! ```text
//! GET /oauth/redirect   -> oauth_redirect
//! GET /return-nav       -> return_nav
//! ```

use axum::routing::get;
use axum::Router;
use shopfront_pipeline::templates::RETURN_NAV_PATH;

use crate::config::OAUTH_REDIRECT_PATH;
use crate::handlers::{auth, navigation};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(OAUTH_REDIRECT_PATH, get(auth::oauth_redirect))
        .route(RETURN_NAV_PATH, get(navigation::return_nav))
}
