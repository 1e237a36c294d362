//! Design creation outside of autofill: blank designs and designs built
//! around an uploaded image. Every created design is saved to the
//! content library.

use std::sync::Arc;

use shopfront_canva::models::{CreateDesignRequest, Design, DesignPage, DesignType};
use shopfront_canva::platform::DesignPlatform;
use shopfront_core::library::{SavedDesign, UNTITLED};
use shopfront_core::product::Product;
use shopfront_core::types::now_millis;
use shopfront_library::ContentLibrary;
use tokio_util::sync::CancellationToken;

use crate::assets::AssetUploader;
use crate::error::AutofillError;

/// Library record for a design returned by the platform.
pub fn saved_design_from(design: &Design) -> SavedDesign {
    SavedDesign {
        id: design.id.clone(),
        title: design
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNTITLED.to_string()),
        edit_url: design.urls.edit_url.clone(),
        created_at: now_millis(),
        thumb: design.thumbnail.as_ref().map(|t| t.url.clone()),
    }
}

pub struct DesignService {
    platform: Arc<dyn DesignPlatform>,
    uploader: AssetUploader,
    library: Arc<ContentLibrary>,
}

impl DesignService {
    pub fn new(
        platform: Arc<dyn DesignPlatform>,
        uploader: AssetUploader,
        library: Arc<ContentLibrary>,
    ) -> Self {
        Self {
            platform,
            uploader,
            library,
        }
    }

    pub async fn create_blank(
        &self,
        title: Option<String>,
        design_type: DesignType,
    ) -> Result<SavedDesign, AutofillError> {
        self.create(CreateDesignRequest {
            design_type: Some(design_type),
            asset_id: None,
            title,
        })
        .await
    }

    /// Upload the product image, then create a design around it titled
    /// with the campaign name.
    pub async fn create_from_product(
        &self,
        product: &Product,
        campaign_name: &str,
        cancel: &CancellationToken,
    ) -> Result<SavedDesign, AutofillError> {
        let asset = self
            .uploader
            .upload_from_url(&product.name, &product.image_url, cancel)
            .await?;

        self.create(CreateDesignRequest {
            design_type: None,
            asset_id: Some(asset.id),
            title: Some(campaign_name.to_string()),
        })
        .await
    }

    /// Upload raw image bytes, then create a design around them.
    pub async fn create_from_upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        title: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<SavedDesign, AutofillError> {
        let asset = self.uploader.upload_bytes(name, bytes, cancel).await?;
        self.create(CreateDesignRequest {
            design_type: None,
            asset_id: Some(asset.id),
            title,
        })
        .await
    }

    pub async fn get(&self, id: &str) -> Result<Design, AutofillError> {
        Ok(self.platform.get_design(id).await?)
    }

    pub async fn list(&self, continuation: Option<&str>) -> Result<DesignPage, AutofillError> {
        Ok(self.platform.list_designs(continuation).await?)
    }

    async fn create(&self, request: CreateDesignRequest) -> Result<SavedDesign, AutofillError> {
        let design = self.platform.create_design(&request).await?;
        tracing::info!(design_id = %design.id, "Design created");

        let saved = saved_design_from(&design);
        if let Err(e) = self.library.save(saved.clone()) {
            tracing::warn!(design_id = %design.id, error = %e, "Failed to save design to library");
        }
        Ok(saved)
    }
}
