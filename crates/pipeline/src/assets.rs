//! Asset uploads with job polling and recent-upload bookkeeping.

use std::sync::Arc;

use shopfront_canva::models::{Asset, AssetUploadJob, JobStatus};
use shopfront_canva::platform::DesignPlatform;
use shopfront_canva::poll::{poll, PollConfig};
use shopfront_core::library::RecentAsset;
use shopfront_core::types::now_millis;
use shopfront_library::RecentAssets;
use tokio_util::sync::CancellationToken;

use crate::error::AutofillError;

/// Uploads images to the platform and waits for the upload job.
#[derive(Clone)]
pub struct AssetUploader {
    platform: Arc<dyn DesignPlatform>,
    poll_config: PollConfig,
    recent: Option<Arc<RecentAssets>>,
}

impl AssetUploader {
    pub fn new(platform: Arc<dyn DesignPlatform>, poll_config: PollConfig) -> Self {
        Self {
            platform,
            poll_config,
            recent: None,
        }
    }

    /// Record every successful upload in `recent`.
    pub fn with_recent(mut self, recent: Arc<RecentAssets>) -> Self {
        self.recent = Some(recent);
        self
    }

    /// Upload raw image bytes.
    pub async fn upload_bytes(
        &self,
        name: &str,
        bytes: Vec<u8>,
        cancel: &CancellationToken,
    ) -> Result<Asset, AutofillError> {
        let job = self.platform.create_asset_upload_job(name, bytes).await?;
        tracing::info!(job_id = %job.id, name, "Asset upload submitted");

        let platform = Arc::clone(&self.platform);
        let job_id = job.id.clone();
        let finished = poll(
            || {
                let platform = Arc::clone(&platform);
                let job_id = job_id.clone();
                async move { platform.get_asset_upload_job(&job_id).await }
            },
            &self.poll_config,
            cancel,
        )
        .await?;

        self.finish(finished)
    }

    /// Have the platform fetch an image from a public URL.
    pub async fn upload_from_url(
        &self,
        name: &str,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Asset, AutofillError> {
        let job = self.platform.create_url_asset_upload_job(name, url).await?;
        tracing::info!(job_id = %job.id, name, url, "URL asset upload submitted");

        let platform = Arc::clone(&self.platform);
        let job_id = job.id.clone();
        let finished = poll(
            || {
                let platform = Arc::clone(&platform);
                let job_id = job_id.clone();
                async move { platform.get_url_asset_upload_job(&job_id).await }
            },
            &self.poll_config,
            cancel,
        )
        .await?;

        self.finish(finished)
    }

    fn finish(&self, job: AssetUploadJob) -> Result<Asset, AutofillError> {
        if job.status == JobStatus::Failed {
            let message = job
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "upload job failed".to_string());
            tracing::warn!(job_id = %job.id, error = %message, "Asset upload failed");
            return Err(AutofillError::UploadFailed(message));
        }

        let asset = job.asset.ok_or(AutofillError::MissingResult("uploaded asset"))?;
        tracing::info!(asset_id = %asset.id, "Asset uploaded");

        if let Some(recent) = &self.recent {
            let record = RecentAsset {
                id: asset.id.clone(),
                name: asset.name.clone(),
                uploaded_at: now_millis(),
                thumb: asset.thumbnail.as_ref().map(|t| t.url.clone()),
            };
            if let Err(e) = recent.save(record) {
                tracing::warn!(asset_id = %asset.id, error = %e, "Failed to record recent upload");
            }
        }

        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use shopfront_canva::fake::FakePlatform;
    use shopfront_library::MemoryStore;

    use super::*;

    fn fast_poll() -> PollConfig {
        PollConfig::fixed(Duration::from_millis(10), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn url_upload_is_recorded_as_recent() {
        let fake = Arc::new(FakePlatform::new());
        let recent = Arc::new(RecentAssets::new(Arc::new(MemoryStore::new())));
        let uploader = AssetUploader::new(fake.clone(), fast_poll()).with_recent(recent.clone());

        let asset = uploader
            .upload_from_url("Mug", "https://img.test/mug.png", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(asset.name, "Mug");
        assert_eq!(fake.upload_names(), ["Mug"]);
        let recorded = recent.load_all();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].id, asset.id);
    }

    #[tokio::test]
    async fn failed_upload_job_carries_its_message() {
        let fake = Arc::new(FakePlatform::new().with_failing_uploads("image not reachable"));
        let uploader = AssetUploader::new(fake, fast_poll());

        let err = uploader
            .upload_bytes("Mug", vec![1, 2, 3], &CancellationToken::new())
            .await
            .unwrap_err();

        assert_matches!(err, AutofillError::UploadFailed(ref m) if m == "image not reachable");
    }
}
