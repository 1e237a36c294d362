pub mod assets;
pub mod auth;
pub mod autofill;
pub mod brand_templates;
pub mod callbacks;
pub mod designs;
pub mod health;
pub mod library;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/authorize                        authorization URL (GET)
/// /auth/status                           connection state (GET)
/// /auth/revoke                           disconnect (POST)
///
/// /user/profile                          connected user (GET)
///
/// /products                              list (GET)
/// /products/{id}                         get (GET)
///
/// /brand-templates                       list (GET)
/// /brand-templates/open                  open in editor (POST)
/// /brand-templates/{id}                  get (GET)
/// /brand-templates/{id}/fields           fields and suggested mappings (GET)
///
/// /autofill/product                      product promo autofill (POST)
/// /autofill/mappings                     explicit field mappings (POST)
/// /autofill/batch                        multi-template autofill (POST)
/// /autofill/batch/jobs                   start background batch (POST)
/// /autofill/batch/jobs/{id}              progress, cancel (GET, DELETE)
///
/// /designs                               list, create (GET, POST)
/// /designs/upload                        design from an uploaded image (POST)
/// /designs/edit                          blank design in editor (POST)
/// /designs/{id}                          get (GET)
///
/// /assets                                upload (POST)
/// /assets/recent                         recently uploaded (GET)
///
/// /library                               list, clear (GET, DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/user", auth::user_router())
        .nest("/products", products::router())
        .nest("/brand-templates", brand_templates::router())
        .nest("/autofill", autofill::router())
        .nest("/designs", designs::router())
        .nest("/assets", assets::router())
        .nest("/library", library::router())
}
