//! The design-platform seam.
//!
//! Orchestration code depends on [`DesignPlatform`] rather than on the
//! concrete HTTP client so it can run against a scripted fake in tests.

use async_trait::async_trait;

use crate::api::{CanvaApi, CanvaApiError};
use crate::models::{
    AssetUploadJob, AutofillJob, BrandTemplate, BrandTemplateDataset, BrandTemplatePage,
    CreateAutofillJobRequest, CreateDesignRequest, Design, DesignPage, ListBrandTemplatesQuery,
    UserProfile,
};

#[async_trait]
pub trait DesignPlatform: Send + Sync {
    async fn list_brand_templates(
        &self,
        query: &ListBrandTemplatesQuery,
    ) -> Result<BrandTemplatePage, CanvaApiError>;

    async fn get_brand_template(&self, id: &str) -> Result<BrandTemplate, CanvaApiError>;

    async fn get_brand_template_dataset(
        &self,
        id: &str,
    ) -> Result<BrandTemplateDataset, CanvaApiError>;

    async fn create_autofill_job(
        &self,
        body: &CreateAutofillJobRequest,
    ) -> Result<AutofillJob, CanvaApiError>;

    async fn get_autofill_job(&self, job_id: &str) -> Result<AutofillJob, CanvaApiError>;

    async fn create_asset_upload_job(
        &self,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<AssetUploadJob, CanvaApiError>;

    async fn get_asset_upload_job(&self, job_id: &str) -> Result<AssetUploadJob, CanvaApiError>;

    async fn create_url_asset_upload_job(
        &self,
        name: &str,
        url: &str,
    ) -> Result<AssetUploadJob, CanvaApiError>;

    async fn get_url_asset_upload_job(
        &self,
        job_id: &str,
    ) -> Result<AssetUploadJob, CanvaApiError>;

    async fn create_design(&self, body: &CreateDesignRequest) -> Result<Design, CanvaApiError>;

    async fn get_design(&self, id: &str) -> Result<Design, CanvaApiError>;

    async fn list_designs(&self, continuation: Option<&str>)
        -> Result<DesignPage, CanvaApiError>;

    async fn get_user_profile(&self) -> Result<UserProfile, CanvaApiError>;
}

#[async_trait]
impl DesignPlatform for CanvaApi {
    async fn list_brand_templates(
        &self,
        query: &ListBrandTemplatesQuery,
    ) -> Result<BrandTemplatePage, CanvaApiError> {
        CanvaApi::list_brand_templates(self, query).await
    }

    async fn get_brand_template(&self, id: &str) -> Result<BrandTemplate, CanvaApiError> {
        CanvaApi::get_brand_template(self, id).await
    }

    async fn get_brand_template_dataset(
        &self,
        id: &str,
    ) -> Result<BrandTemplateDataset, CanvaApiError> {
        CanvaApi::get_brand_template_dataset(self, id).await
    }

    async fn create_autofill_job(
        &self,
        body: &CreateAutofillJobRequest,
    ) -> Result<AutofillJob, CanvaApiError> {
        CanvaApi::create_autofill_job(self, body).await
    }

    async fn get_autofill_job(&self, job_id: &str) -> Result<AutofillJob, CanvaApiError> {
        CanvaApi::get_autofill_job(self, job_id).await
    }

    async fn create_asset_upload_job(
        &self,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<AssetUploadJob, CanvaApiError> {
        CanvaApi::create_asset_upload_job(self, name, bytes).await
    }

    async fn get_asset_upload_job(&self, job_id: &str) -> Result<AssetUploadJob, CanvaApiError> {
        CanvaApi::get_asset_upload_job(self, job_id).await
    }

    async fn create_url_asset_upload_job(
        &self,
        name: &str,
        url: &str,
    ) -> Result<AssetUploadJob, CanvaApiError> {
        CanvaApi::create_url_asset_upload_job(self, name, url).await
    }

    async fn get_url_asset_upload_job(
        &self,
        job_id: &str,
    ) -> Result<AssetUploadJob, CanvaApiError> {
        CanvaApi::get_url_asset_upload_job(self, job_id).await
    }

    async fn create_design(&self, body: &CreateDesignRequest) -> Result<Design, CanvaApiError> {
        CanvaApi::create_design(self, body).await
    }

    async fn get_design(&self, id: &str) -> Result<Design, CanvaApiError> {
        CanvaApi::get_design(self, id).await
    }

    async fn list_designs(
        &self,
        continuation: Option<&str>,
    ) -> Result<DesignPage, CanvaApiError> {
        CanvaApi::list_designs(self, continuation).await
    }

    async fn get_user_profile(&self) -> Result<UserProfile, CanvaApiError> {
        CanvaApi::get_user_profile(self).await
    }
}
