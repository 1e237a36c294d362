#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use shopfront_canva::fake::FakePlatform;
use shopfront_canva::oauth::{OAuthClient, OAuthConfig};
use shopfront_library::{KeyValueStore, MemoryStore};
use shopfront_pipeline::templates::NoopLauncher;
use tower::ServiceExt;

use shopfront_api::auth::{StaticPlatformProvider, TokenStore};
use shopfront_api::config::ServerConfig;
use shopfront_api::router::build_app_router;
use shopfront_api::state::AppState;

pub const FRONTEND_URL: &str = "http://localhost:3000";

/// Build a test `ServerConfig` with OAuth disabled and fast polling.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![FRONTEND_URL.to_string()],
        request_timeout_secs: 30,
        backend_url: "http://127.0.0.1:3001".to_string(),
        frontend_url: FRONTEND_URL.to_string(),
        canva_api_base_url: "http://127.0.0.1:9".to_string(),
        oauth: OAuthConfig {
            client_id: String::new(),
            client_secret: String::new(),
            authorize_url: "https://canva.test/oauth/authorize".to_string(),
            api_base_url: "http://127.0.0.1:9".to_string(),
            redirect_uri: "http://127.0.0.1:3001/oauth/redirect".to_string(),
            scopes: vec!["design:meta:read".to_string()],
        },
        data_dir: PathBuf::from("unused"),
        poll_interval_ms: 1,
        poll_timeout_secs: 5,
        open_browser: false,
    }
}

/// Full application router over `platform` and an in-memory store.
pub fn build_test_app(platform: Arc<FakePlatform>) -> Router {
    build_test_app_with_store(platform, Arc::new(MemoryStore::new()))
}

/// Same middleware stack as `main.rs`, with the platform served directly
/// instead of through OAuth.
pub fn build_test_app_with_store(
    platform: Arc<FakePlatform>,
    store: Arc<dyn KeyValueStore>,
) -> Router {
    let config = test_config();
    let tokens = Arc::new(TokenStore::load(
        OAuthClient::new(config.oauth.clone()),
        Arc::clone(&store),
    ));
    let state = AppState::new(
        config.clone(),
        store,
        tokens,
        Arc::new(StaticPlatformProvider::new(platform)),
        Arc::new(NoopLauncher),
    );
    build_app_router(state, &config)
}

/// Fake platform with two promo templates, as most tests need.
pub fn promo_platform() -> FakePlatform {
    FakePlatform::new()
        .with_template("T1", "Summer Sale")
        .with_promo_dataset("T1")
        .with_template("T2", "Winter Sale")
        .with_promo_dataset("T2")
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).expect("valid request"))
        .await
        .expect("infallible")
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}
