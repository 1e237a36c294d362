//! Autofill orchestration: dataset construction, submission and polling.
//!
//! Two entry points mirror the two ways a dataset is produced:
//! [`AutofillOrchestrator::autofill_product`] fills the fixed promo fields
//! from a product, [`AutofillOrchestrator::autofill_mappings`] converts
//! caller-supplied field mappings.

use std::sync::Arc;

use shopfront_canva::models::{AutofillDesign, AutofillJob, CreateAutofillJobRequest, JobStatus};
use shopfront_canva::platform::DesignPlatform;
use shopfront_canva::poll::{poll, PollConfig};
use shopfront_core::dataset::{
    check_promo_schema, promo_dataset, schema_fields, Dataset, DatasetSchema, TemplateField,
};
use shopfront_core::field_mapping::{build_dataset, FieldMapping, MappingDraft, MappingValue};
use shopfront_core::product::Product;
use tokio_util::sync::CancellationToken;

use crate::assets::AssetUploader;
use crate::error::AutofillError;

pub struct AutofillOrchestrator {
    platform: Arc<dyn DesignPlatform>,
    uploader: AssetUploader,
    poll_config: PollConfig,
}

impl AutofillOrchestrator {
    pub fn new(
        platform: Arc<dyn DesignPlatform>,
        uploader: AssetUploader,
        poll_config: PollConfig,
    ) -> Self {
        Self {
            platform,
            uploader,
            poll_config,
        }
    }

    pub fn uploader(&self) -> &AssetUploader {
        &self.uploader
    }

    /// The template's dataset schema, `None` when it has no dataset.
    pub async fn template_schema(
        &self,
        template_id: &str,
    ) -> Result<Option<DatasetSchema>, AutofillError> {
        let dataset = self.platform.get_brand_template_dataset(template_id).await?;
        Ok(dataset.schema())
    }

    /// Fields a mapping form should offer for the template.
    pub async fn template_fields(
        &self,
        template_id: &str,
    ) -> Result<Vec<TemplateField>, AutofillError> {
        Ok(self
            .template_schema(template_id)
            .await?
            .map(|schema| schema_fields(&schema))
            .unwrap_or_default())
    }

    /// Fill a template's promo fields from `product`.
    ///
    /// The schema is checked before the product image is uploaded, so a
    /// template missing `name`, `image` or `price` fails without side
    /// effects.
    pub async fn autofill_product(
        &self,
        template_id: &str,
        product: &Product,
        discount: &str,
        title: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<AutofillDesign, AutofillError> {
        self.ensure_promo_schema(template_id).await?;

        let asset = self
            .uploader
            .upload_from_url(&product.name, &product.image_url, cancel)
            .await?;

        let dataset = promo_dataset(product, discount, &asset.id);
        self.submit_and_wait(template_id, title, dataset, cancel).await
    }

    /// Like [`Self::autofill_product`] with an already uploaded image.
    pub async fn autofill_product_with_asset(
        &self,
        template_id: &str,
        product: &Product,
        discount: &str,
        asset_id: &str,
        title: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<AutofillDesign, AutofillError> {
        self.ensure_promo_schema(template_id).await?;
        let dataset = promo_dataset(product, discount, asset_id);
        self.submit_and_wait(template_id, title, dataset, cancel).await
    }

    /// Fill a template from explicit field mappings.
    ///
    /// Every mapping is validated before any request is made.
    pub async fn autofill_mappings(
        &self,
        template_id: &str,
        mappings: &[FieldMapping],
        title: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<AutofillDesign, AutofillError> {
        let dataset = build_dataset(mappings)?;
        self.submit_and_wait(template_id, title, dataset, cancel).await
    }

    /// Turn form drafts into concrete mappings.
    ///
    /// The product image is uploaded once, and only when some draft maps
    /// to it. Drafts that cannot be resolved come back without a value so
    /// that dataset validation reports them by name.
    pub async fn resolve_mappings(
        &self,
        drafts: &[MappingDraft],
        product: Option<&Product>,
        discount: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<FieldMapping>, AutofillError> {
        let image_asset_id = match product {
            Some(product) if drafts.iter().any(MappingDraft::needs_product_image) => Some(
                self.uploader
                    .upload_from_url(&product.name, &product.image_url, cancel)
                    .await?
                    .id,
            ),
            _ => None,
        };

        Ok(drafts
            .iter()
            .map(|draft| {
                draft
                    .resolve(product, discount, image_asset_id.as_deref())
                    .unwrap_or_else(|| FieldMapping {
                        template_field_name: draft.template_field_name.clone(),
                        field_type: draft.field_type,
                        value: None::<MappingValue>,
                        source: Some(draft.source),
                        product_field: draft.product_field,
                    })
            })
            .collect())
    }

    /// Submit a dataset and wait for the job to finish.
    pub async fn submit_and_wait(
        &self,
        template_id: &str,
        title: Option<String>,
        data: Dataset,
        cancel: &CancellationToken,
    ) -> Result<AutofillDesign, AutofillError> {
        let request = CreateAutofillJobRequest {
            brand_template_id: template_id.to_string(),
            title,
            data,
        };

        let job = self.platform.create_autofill_job(&request).await?;
        tracing::info!(job_id = %job.id, template_id, "Autofill job submitted");

        let finished = self.wait_for_job(&job.id, cancel).await?;

        if finished.status == JobStatus::Failed {
            let message = finished
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "no error details".to_string());
            tracing::warn!(job_id = %finished.id, template_id, error = %message, "Autofill job failed");
            return Err(AutofillError::JobFailed(message));
        }

        let design = finished
            .result
            .map(|r| r.design)
            .ok_or(AutofillError::MissingResult("autofill result"))?;
        tracing::info!(job_id = %finished.id, design_id = ?design.id, "Autofill job finished");
        Ok(design)
    }

    async fn wait_for_job(
        &self,
        job_id: &str,
        cancel: &CancellationToken,
    ) -> Result<AutofillJob, AutofillError> {
        let platform = Arc::clone(&self.platform);
        let job = poll(
            || {
                let platform = Arc::clone(&platform);
                let job_id = job_id.to_string();
                async move { platform.get_autofill_job(&job_id).await }
            },
            &self.poll_config,
            cancel,
        )
        .await?;
        Ok(job)
    }

    async fn ensure_promo_schema(&self, template_id: &str) -> Result<(), AutofillError> {
        let schema = self
            .template_schema(template_id)
            .await?
            .ok_or_else(|| AutofillError::MissingDataset(template_id.to_string()))?;
        check_promo_schema(&schema)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use shopfront_canva::fake::{AutofillScript, FakePlatform};
    use shopfront_core::dataset::{DatasetValue, FieldType};
    use shopfront_core::error::CoreError;
    use shopfront_core::field_mapping::{suggest_mappings, MappingSource};
    use shopfront_core::product::ProductCatalog;

    use super::*;

    fn orchestrator(fake: Arc<FakePlatform>) -> AutofillOrchestrator {
        let poll = PollConfig::fixed(Duration::from_millis(10), Duration::from_secs(5));
        let uploader = AssetUploader::new(fake.clone(), poll.clone());
        AutofillOrchestrator::new(fake, uploader, poll)
    }

    fn product() -> Product {
        ProductCatalog::demo().get(1).unwrap().clone()
    }

    fn text(mapping_field: &str, value: &str, ty: FieldType) -> FieldMapping {
        FieldMapping {
            template_field_name: mapping_field.to_string(),
            field_type: ty,
            value: Some(MappingValue::Text(value.to_string())),
            source: Some(MappingSource::Custom),
            product_field: None,
        }
    }

    #[tokio::test]
    async fn product_autofill_submits_promo_dataset() {
        let fake = Arc::new(
            FakePlatform::new()
                .with_template("T1", "Sale")
                .with_promo_dataset("T1")
                .with_script(
                    "T1",
                    AutofillScript::Succeed {
                        polls: 2,
                        job_thumbnail: None,
                        design_thumbnail: None,
                    },
                ),
        );
        let product = product();

        let design = orchestrator(fake.clone())
            .autofill_product("T1", &product, "20%", None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(design.id.as_deref(), Some("design-T1"));
        let submitted = fake.submitted();
        assert_eq!(submitted.len(), 1);
        let data = &submitted[0].data;
        assert_eq!(data["name"], DatasetValue::text(product.name.clone()));
        assert_eq!(data["price"], DatasetValue::text(product.display_price()));
        assert_eq!(data["discount"], DatasetValue::text("Save 20%"));
        assert_eq!(data["image"].field_type(), FieldType::Image);
    }

    #[tokio::test]
    async fn schema_mismatch_fails_before_upload() {
        let fake = Arc::new(
            FakePlatform::new()
                .with_template("T1", "Sale")
                .with_dataset("T1", &[("name", FieldType::Text), ("headline", FieldType::Text)]),
        );

        let err = orchestrator(fake.clone())
            .autofill_product("T1", &product(), "10%", None, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_matches!(
            err,
            AutofillError::Core(CoreError::SchemaMismatch { ref missing, .. })
                if missing == &["image".to_string(), "price".to_string()]
        );
        assert!(fake.upload_names().is_empty());
        assert!(fake.submitted().is_empty());
    }

    #[tokio::test]
    async fn template_without_dataset_is_rejected() {
        let fake = Arc::new(FakePlatform::new().with_template("T1", "Plain"));

        let err = orchestrator(fake)
            .autofill_product("T1", &product(), "10%", None, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_matches!(err, AutofillError::MissingDataset(ref id) if id == "T1");
    }

    #[tokio::test]
    async fn mapping_autofill_validates_before_submitting() {
        let fake = Arc::new(FakePlatform::new().with_template("T1", "Sale"));
        let mut missing = text("headline", "", FieldType::Text);
        missing.value = None;

        let err = orchestrator(fake.clone())
            .autofill_mappings("T1", &[missing], None, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_matches!(err, AutofillError::Core(CoreError::Validation(_)));
        assert!(fake.submitted().is_empty());
    }

    #[tokio::test]
    async fn chart_fields_are_unsupported() {
        let fake = Arc::new(FakePlatform::new().with_template("T1", "Sale"));

        let err = orchestrator(fake.clone())
            .autofill_mappings(
                "T1",
                &[text("sales", "1,2,3", FieldType::Chart)],
                None,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert_matches!(err, AutofillError::Core(CoreError::UnsupportedFieldType { .. }));
        assert!(fake.submitted().is_empty());
    }

    #[tokio::test]
    async fn failed_job_reports_its_message() {
        let fake = Arc::new(
            FakePlatform::new()
                .with_template("T1", "Sale")
                .with_script("T1", AutofillScript::FailJob("font missing".into())),
        );

        let err = orchestrator(fake)
            .autofill_mappings(
                "T1",
                &[text("headline", "Hello", FieldType::Text)],
                None,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert_matches!(err, AutofillError::JobFailed(ref m) if m == "font missing");
    }

    #[tokio::test(start_paused = true)]
    async fn job_that_never_finishes_times_out() {
        let fake = Arc::new(
            FakePlatform::new()
                .with_template("T1", "Sale")
                .with_script("T1", AutofillScript::NeverFinish),
        );

        let err = orchestrator(fake)
            .autofill_mappings(
                "T1",
                &[text("headline", "Hello", FieldType::Text)],
                None,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert_matches!(err, AutofillError::Timeout(_));
    }

    #[tokio::test]
    async fn resolved_mappings_upload_image_once() {
        let fake = Arc::new(
            FakePlatform::new()
                .with_template("T1", "Sale")
                .with_dataset(
                    "T1",
                    &[
                        ("product_title", FieldType::Text),
                        ("hero_photo", FieldType::Image),
                        ("price_tag", FieldType::Text),
                        ("sale_line", FieldType::Text),
                    ],
                ),
        );
        let orch = orchestrator(fake.clone());
        let product = product();

        let fields = orch.template_fields("T1").await.unwrap();
        let drafts = suggest_mappings(&fields);
        let mappings = orch
            .resolve_mappings(&drafts, Some(&product), "15%", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(fake.upload_names().len(), 1);
        let dataset = build_dataset(&mappings).unwrap();
        assert_eq!(dataset["sale_line"], DatasetValue::text("Save 15%"));
        assert_eq!(dataset["product_title"], DatasetValue::text(product.name.clone()));
        assert_eq!(dataset["hero_photo"].field_type(), FieldType::Image);
    }

    #[tokio::test]
    async fn unresolvable_draft_surfaces_as_missing_value() {
        let fake = Arc::new(FakePlatform::new());
        let orch = orchestrator(fake.clone());
        let drafts = suggest_mappings(&[TemplateField {
            field_name: "name".into(),
            field_type: FieldType::Text,
        }]);

        let mappings = orch
            .resolve_mappings(&drafts, None, "", &CancellationToken::new())
            .await
            .unwrap();

        assert!(mappings[0].value.is_none());
        assert_matches!(build_dataset(&mappings), Err(CoreError::Validation(_)));
    }
}
