use std::sync::Arc;

use shopfront_canva::platform::DesignPlatform;
use shopfront_core::product::ProductCatalog;
use shopfront_library::{ContentLibrary, KeyValueStore, RecentAssets};
use shopfront_pipeline::assets::AssetUploader;
use shopfront_pipeline::autofill::AutofillOrchestrator;
use shopfront_pipeline::batch::BatchAutofill;
use shopfront_pipeline::designs::DesignService;
use shopfront_pipeline::templates::{BrandTemplateGateway, Launcher};
use tokio_util::sync::CancellationToken;

use crate::auth::{PlatformProvider, TokenStore};
use crate::batches::BatchRegistry;
use crate::config::ServerConfig;
use crate::error::AppResult;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind an `Arc` or is a token handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub catalog: Arc<ProductCatalog>,
    pub library: Arc<ContentLibrary>,
    pub recent_assets: Arc<RecentAssets>,
    pub tokens: Arc<TokenStore>,
    pub platforms: Arc<dyn PlatformProvider>,
    pub launcher: Arc<dyn Launcher>,
    pub batches: Arc<BatchRegistry>,
    /// Cancelled on shutdown; in-flight polling observes child tokens.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn KeyValueStore>,
        tokens: Arc<TokenStore>,
        platforms: Arc<dyn PlatformProvider>,
        launcher: Arc<dyn Launcher>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            catalog: Arc::new(ProductCatalog::demo()),
            library: Arc::new(ContentLibrary::new(Arc::clone(&store))),
            recent_assets: Arc::new(RecentAssets::new(store)),
            tokens,
            platforms,
            launcher,
            batches: Arc::new(BatchRegistry::new()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Platform client for the connected account.
    pub async fn platform(&self) -> AppResult<Arc<dyn DesignPlatform>> {
        self.platforms.platform().await
    }

    /// Token for one request's worth of work.
    pub fn cancel_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    pub fn uploader(&self, platform: Arc<dyn DesignPlatform>) -> AssetUploader {
        AssetUploader::new(platform, self.config.poll_config())
            .with_recent(Arc::clone(&self.recent_assets))
    }

    pub fn orchestrator(&self, platform: Arc<dyn DesignPlatform>) -> AutofillOrchestrator {
        AutofillOrchestrator::new(
            Arc::clone(&platform),
            self.uploader(platform),
            self.config.poll_config(),
        )
    }

    pub fn batch(&self, platform: Arc<dyn DesignPlatform>) -> BatchAutofill {
        let orchestrator = Arc::new(self.orchestrator(Arc::clone(&platform)));
        BatchAutofill::new(orchestrator, platform).with_library(Arc::clone(&self.library))
    }

    pub fn gateway(&self, platform: Arc<dyn DesignPlatform>) -> BrandTemplateGateway {
        BrandTemplateGateway::new(
            platform,
            &self.config.backend_url,
            Arc::clone(&self.launcher),
        )
    }

    pub fn designs(&self, platform: Arc<dyn DesignPlatform>) -> DesignService {
        DesignService::new(
            Arc::clone(&platform),
            self.uploader(platform),
            Arc::clone(&self.library),
        )
    }
}
