//! Where handlers get a [`DesignPlatform`] from.

use std::sync::Arc;

use async_trait::async_trait;
use shopfront_canva::api::CanvaApi;
use shopfront_canva::platform::DesignPlatform;

use crate::auth::tokens::TokenStore;
use crate::error::AppResult;

/// Hands out a platform client authenticated for the current user.
#[async_trait]
pub trait PlatformProvider: Send + Sync {
    async fn platform(&self) -> AppResult<Arc<dyn DesignPlatform>>;
}

/// Production provider: the REST client bound to a fresh access token.
pub struct OAuthPlatformProvider {
    api: CanvaApi,
    tokens: Arc<TokenStore>,
}

impl OAuthPlatformProvider {
    pub fn new(api: CanvaApi, tokens: Arc<TokenStore>) -> Self {
        Self { api, tokens }
    }
}

#[async_trait]
impl PlatformProvider for OAuthPlatformProvider {
    async fn platform(&self) -> AppResult<Arc<dyn DesignPlatform>> {
        let token = self.tokens.access_token().await?;
        Ok(Arc::new(self.api.with_access_token(token)))
    }
}

/// Always returns the same platform. Used with in-memory platforms.
pub struct StaticPlatformProvider {
    platform: Arc<dyn DesignPlatform>,
}

impl StaticPlatformProvider {
    pub fn new(platform: Arc<dyn DesignPlatform>) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl PlatformProvider for StaticPlatformProvider {
    async fn platform(&self) -> AppResult<Arc<dyn DesignPlatform>> {
        Ok(Arc::clone(&self.platform))
    }
}
