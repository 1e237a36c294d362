use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use shopfront_canva::api::CanvaApi;
use shopfront_canva::oauth::OAuthClient;
use shopfront_library::FileStore;
use shopfront_pipeline::templates::{BrowserLauncher, Launcher, NoopLauncher};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopfront_api::auth::{OAuthPlatformProvider, TokenStore};
use shopfront_api::config::ServerConfig;
use shopfront_api::router::build_app_router;
use shopfront_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "shopfront_api=debug,shopfront_pipeline=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid configuration")?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    if !config.oauth.is_configured() {
        tracing::warn!("CANVA_CLIENT_ID / CANVA_CLIENT_SECRET not set; platform calls will fail");
    }

    // --- Storage ---
    let store = Arc::new(
        FileStore::open(&config.data_dir)
            .with_context(|| format!("Failed to open data dir {}", config.data_dir.display()))?,
    );
    tracing::info!(dir = %config.data_dir.display(), "Key-value store opened");

    // --- Platform access ---
    let tokens = Arc::new(TokenStore::load(
        OAuthClient::new(config.oauth.clone()),
        store.clone(),
    ));
    let platforms = Arc::new(OAuthPlatformProvider::new(
        CanvaApi::new(config.canva_api_base_url.clone()),
        Arc::clone(&tokens),
    ));
    let launcher: Arc<dyn Launcher> = if config.open_browser {
        Arc::new(BrowserLauncher)
    } else {
        Arc::new(NoopLauncher)
    };

    // --- App state ---
    let state = AppState::new(config.clone(), store, tokens, platforms, launcher);
    let shutdown = state.shutdown.clone();

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Stop polling loops so in-flight requests settle promptly.
            shutdown.cancel();
        })
        .await
        .context("Server error")?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
