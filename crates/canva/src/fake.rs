//! Scripted in-memory [`DesignPlatform`] for tests.
//!
//! Templates, datasets and per-template autofill behaviour are set up
//! with builder methods; every submitted autofill request is recorded so
//! tests can assert on the datasets that would have gone over the wire.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use shopfront_core::dataset::{DatasetSchema, FieldType};

use crate::api::CanvaApiError;
use crate::models::{
    Asset, AssetUploadJob, AutofillDesign, AutofillJob, AutofillResult, BrandTemplate,
    BrandTemplateDataset, BrandTemplatePage, CreateAutofillJobRequest, CreateDesignRequest,
    DataField, Design, DesignPage, DesignUrls, JobError, JobStatus, ListBrandTemplatesQuery,
    Thumbnail, UserProfile,
};
use crate::platform::DesignPlatform;

/// How the fake answers autofill requests for one template.
#[derive(Debug, Clone)]
pub enum AutofillScript {
    /// Report `in_progress` for `polls` checks, then succeed.
    Succeed {
        polls: usize,
        job_thumbnail: Option<String>,
        design_thumbnail: Option<String>,
    },
    /// Reject the submission itself with an API error.
    RejectSubmit(String),
    /// Accept the job, then report it failed.
    FailJob(String),
    /// Stay `in_progress` forever.
    NeverFinish,
    /// Succeed, but the follow-up design lookup returns 404.
    DesignLookupFails,
}

impl Default for AutofillScript {
    fn default() -> Self {
        Self::Succeed {
            polls: 0,
            job_thumbnail: None,
            design_thumbnail: None,
        }
    }
}

struct FakeJob {
    template_id: String,
    remaining_polls: usize,
    script: AutofillScript,
}

#[derive(Default)]
struct FakeState {
    templates: Vec<BrandTemplate>,
    page_size: Option<usize>,
    datasets: HashMap<String, DatasetSchema>,
    scripts: HashMap<String, AutofillScript>,
    jobs: HashMap<String, FakeJob>,
    uploads: HashMap<String, AssetUploadJob>,
    designs: Vec<Design>,
    submitted: Vec<CreateAutofillJobRequest>,
    upload_names: Vec<String>,
    upload_failure: Option<String>,
    upload_polls: usize,
    upload_remaining: HashMap<String, usize>,
    list_calls: usize,
    next_id: u64,
}

impl FakeState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

#[derive(Default)]
pub struct FakePlatform {
    state: Mutex<FakeState>,
}

fn api_error(status: u16, message: impl Into<String>) -> CanvaApiError {
    CanvaApiError::Api {
        status,
        code: None,
        message: message.into(),
    }
}

fn thumbnail(url: &Option<String>) -> Option<Thumbnail> {
    url.as_ref().map(|url| Thumbnail {
        width: Some(400),
        height: Some(300),
        url: url.clone(),
    })
}

fn design(id: &str, title: &str, thumb: Option<Thumbnail>) -> Design {
    Design {
        id: id.to_string(),
        title: Some(title.to_string()),
        thumbnail: thumb,
        urls: DesignUrls {
            edit_url: format!("https://canva.test/design/{id}/edit"),
            view_url: format!("https://canva.test/design/{id}/view"),
        },
        created_at: Some(1_700_000_000),
        updated_at: Some(1_700_000_000),
        page_count: Some(1),
    }
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ---- setup ----

    pub fn with_template(self, id: &str, title: &str) -> Self {
        self.lock().templates.push(BrandTemplate {
            id: id.to_string(),
            title: title.to_string(),
            view_url: None,
            create_url: format!("https://canva.test/brand-templates/{id}/create"),
            thumbnail: None,
            created_at: 0,
            updated_at: 0,
        });
        self
    }

    /// Give a template a dataset schema.
    pub fn with_dataset(self, id: &str, fields: &[(&str, FieldType)]) -> Self {
        let schema = fields
            .iter()
            .map(|(name, ty)| (name.to_string(), *ty))
            .collect();
        self.lock().datasets.insert(id.to_string(), schema);
        self
    }

    /// Give a template the fields a promo autofill needs.
    pub fn with_promo_dataset(self, id: &str) -> Self {
        self.with_dataset(
            id,
            &[
                ("name", FieldType::Text),
                ("image", FieldType::Image),
                ("price", FieldType::Text),
                ("discount", FieldType::Text),
            ],
        )
    }

    pub fn with_script(self, template_id: &str, script: AutofillScript) -> Self {
        self.lock().scripts.insert(template_id.to_string(), script);
        self
    }

    /// Split template listings into pages of `size`.
    pub fn with_page_size(self, size: usize) -> Self {
        self.lock().page_size = Some(size.max(1));
        self
    }

    /// Make every asset upload job fail with `message`.
    pub fn with_failing_uploads(self, message: &str) -> Self {
        self.lock().upload_failure = Some(message.to_string());
        self
    }

    /// Keep each upload `in_progress` for `polls` status checks.
    pub fn with_slow_uploads(self, polls: usize) -> Self {
        self.lock().upload_polls = polls;
        self
    }

    // ---- inspection ----

    /// Autofill requests received so far, in arrival order.
    pub fn submitted(&self) -> Vec<CreateAutofillJobRequest> {
        self.lock().submitted.clone()
    }

    /// Names of assets uploaded so far.
    pub fn upload_names(&self) -> Vec<String> {
        self.lock().upload_names.clone()
    }

    /// Number of template listing requests served.
    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }

    fn start_upload(&self, name: &str) -> AssetUploadJob {
        let mut state = self.lock();
        let job_id = state.next_id("upload");
        state.upload_names.push(name.to_string());

        let job = match state.upload_failure.clone() {
            Some(message) => AssetUploadJob {
                id: job_id.clone(),
                status: JobStatus::Failed,
                error: Some(JobError {
                    code: "fetch_failed".into(),
                    message,
                }),
                asset: None,
            },
            None => {
                let asset_id = state.next_id("asset");
                AssetUploadJob {
                    id: job_id.clone(),
                    status: JobStatus::InProgress,
                    error: None,
                    asset: Some(Asset {
                        id: asset_id,
                        name: name.to_string(),
                        tags: Vec::new(),
                        thumbnail: None,
                        created_at: 0,
                        updated_at: 0,
                    }),
                }
            }
        };

        let polls = state.upload_polls;
        state.upload_remaining.insert(job_id.clone(), polls);
        state.uploads.insert(job_id, job.clone());
        AssetUploadJob {
            asset: None,
            ..job
        }
    }

    fn upload_status(&self, job_id: &str) -> Result<AssetUploadJob, CanvaApiError> {
        let mut state = self.lock();
        if let Some(remaining) = state.upload_remaining.get_mut(job_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(AssetUploadJob {
                    status: JobStatus::InProgress,
                    error: None,
                    asset: None,
                    id: job_id.to_string(),
                });
            }
        }
        let job = state
            .uploads
            .get(job_id)
            .cloned()
            .ok_or_else(|| api_error(404, format!("Upload job {job_id} not found")))?;
        Ok(match job.status {
            JobStatus::InProgress => AssetUploadJob {
                status: JobStatus::Success,
                ..job
            },
            _ => job,
        })
    }
}

#[async_trait]
impl DesignPlatform for FakePlatform {
    async fn list_brand_templates(
        &self,
        query: &ListBrandTemplatesQuery,
    ) -> Result<BrandTemplatePage, CanvaApiError> {
        let mut state = self.lock();
        state.list_calls += 1;

        let matching: Vec<BrandTemplate> = state
            .templates
            .iter()
            .filter(|t| match &query.query {
                Some(q) => t.title.to_lowercase().contains(&q.to_lowercase()),
                None => true,
            })
            .filter(|t| match query.dataset.unwrap_or_default() {
                crate::models::DatasetFilter::Any => true,
                crate::models::DatasetFilter::NonEmpty => state.datasets.contains_key(&t.id),
            })
            .cloned()
            .collect();

        let start: usize = match &query.continuation {
            Some(token) => token
                .parse()
                .map_err(|_| api_error(400, "Invalid continuation token"))?,
            None => 0,
        };
        let size = state.page_size.unwrap_or(matching.len().max(1));
        let end = (start + size).min(matching.len());

        Ok(BrandTemplatePage {
            items: matching.get(start..end).unwrap_or_default().to_vec(),
            continuation: (end < matching.len()).then(|| end.to_string()),
        })
    }

    async fn get_brand_template(&self, id: &str) -> Result<BrandTemplate, CanvaApiError> {
        self.lock()
            .templates
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| api_error(404, format!("Brand template {id} not found")))
    }

    async fn get_brand_template_dataset(
        &self,
        id: &str,
    ) -> Result<BrandTemplateDataset, CanvaApiError> {
        let state = self.lock();
        if !state.templates.iter().any(|t| t.id == id) {
            return Err(api_error(404, format!("Brand template {id} not found")));
        }
        Ok(BrandTemplateDataset {
            dataset: state.datasets.get(id).map(|schema| {
                schema
                    .iter()
                    .map(|(name, ty)| (name.clone(), DataField { field_type: *ty }))
                    .collect()
            }),
        })
    }

    async fn create_autofill_job(
        &self,
        body: &CreateAutofillJobRequest,
    ) -> Result<AutofillJob, CanvaApiError> {
        let mut state = self.lock();
        state.submitted.push(body.clone());

        let script = state
            .scripts
            .get(&body.brand_template_id)
            .cloned()
            .unwrap_or_default();

        if let AutofillScript::RejectSubmit(message) = &script {
            return Err(api_error(400, message.clone()));
        }

        let remaining_polls = match &script {
            AutofillScript::Succeed { polls, .. } => *polls,
            _ => 0,
        };
        let id = state.next_id("job");
        state.jobs.insert(
            id.clone(),
            FakeJob {
                template_id: body.brand_template_id.clone(),
                remaining_polls,
                script,
            },
        );

        Ok(AutofillJob {
            id,
            status: JobStatus::InProgress,
            result: None,
            error: None,
        })
    }

    async fn get_autofill_job(&self, job_id: &str) -> Result<AutofillJob, CanvaApiError> {
        let mut state = self.lock();
        let job = state
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| api_error(404, format!("Job {job_id} not found")))?;

        let in_progress = AutofillJob {
            id: job_id.to_string(),
            status: JobStatus::InProgress,
            result: None,
            error: None,
        };

        if job.remaining_polls > 0 {
            job.remaining_polls -= 1;
            return Ok(in_progress);
        }

        let template_id = job.template_id.clone();
        let design_id = format!("design-{template_id}");

        match job.script.clone() {
            AutofillScript::NeverFinish => Ok(in_progress),
            AutofillScript::FailJob(message) => Ok(AutofillJob {
                status: JobStatus::Failed,
                error: Some(JobError {
                    code: "autofill_error".into(),
                    message,
                }),
                ..in_progress
            }),
            AutofillScript::RejectSubmit(_) => Err(api_error(500, "unreachable job")),
            AutofillScript::DesignLookupFails => Ok(AutofillJob {
                status: JobStatus::Success,
                result: Some(AutofillResult {
                    kind: Some("create_design".into()),
                    design: AutofillDesign {
                        id: Some(format!("missing-{template_id}")),
                        title: None,
                        url: None,
                        thumbnail: None,
                        urls: None,
                    },
                }),
                ..in_progress
            }),
            AutofillScript::Succeed {
                job_thumbnail,
                design_thumbnail,
                ..
            } => {
                if !state.designs.iter().any(|d| d.id == design_id) {
                    let title = format!("Autofill {template_id}");
                    state
                        .designs
                        .push(design(&design_id, &title, thumbnail(&design_thumbnail)));
                }
                Ok(AutofillJob {
                    status: JobStatus::Success,
                    result: Some(AutofillResult {
                        kind: Some("create_design".into()),
                        design: AutofillDesign {
                            id: Some(design_id.clone()),
                            title: Some(format!("Autofill {template_id}")),
                            url: None,
                            thumbnail: thumbnail(&job_thumbnail),
                            urls: None,
                        },
                    }),
                    ..in_progress
                })
            }
        }
    }

    async fn create_asset_upload_job(
        &self,
        name: &str,
        _bytes: Vec<u8>,
    ) -> Result<AssetUploadJob, CanvaApiError> {
        Ok(self.start_upload(name))
    }

    async fn get_asset_upload_job(&self, job_id: &str) -> Result<AssetUploadJob, CanvaApiError> {
        self.upload_status(job_id)
    }

    async fn create_url_asset_upload_job(
        &self,
        name: &str,
        _url: &str,
    ) -> Result<AssetUploadJob, CanvaApiError> {
        Ok(self.start_upload(name))
    }

    async fn get_url_asset_upload_job(
        &self,
        job_id: &str,
    ) -> Result<AssetUploadJob, CanvaApiError> {
        self.upload_status(job_id)
    }

    async fn create_design(&self, body: &CreateDesignRequest) -> Result<Design, CanvaApiError> {
        let mut state = self.lock();
        let id = state.next_id("design");
        let created = design(&id, body.title.as_deref().unwrap_or("Untitled"), None);
        state.designs.push(created.clone());
        Ok(created)
    }

    async fn get_design(&self, id: &str) -> Result<Design, CanvaApiError> {
        self.lock()
            .designs
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| api_error(404, format!("Design {id} not found")))
    }

    async fn list_designs(
        &self,
        _continuation: Option<&str>,
    ) -> Result<DesignPage, CanvaApiError> {
        Ok(DesignPage {
            items: self.lock().designs.clone(),
            continuation: None,
        })
    }

    async fn get_user_profile(&self) -> Result<UserProfile, CanvaApiError> {
        Ok(UserProfile {
            display_name: Some("Fake User".into()),
        })
    }
}
