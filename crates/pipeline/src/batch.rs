//! Multi-template autofill with all-settled semantics.
//!
//! [`BatchAutofill::run`] uploads the product image once, then submits one
//! autofill per template. Sub-tasks run concurrently on the calling task
//! through a [`FuturesUnordered`] set; a failing template never aborts its
//! siblings. Each finished job is merged with a design lookup and saved
//! to the content library.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use shopfront_canva::models::{AutofillDesign, Design};
use shopfront_canva::platform::DesignPlatform;
use shopfront_core::library::{SavedDesign, UNTITLED};
use shopfront_core::product::Product;
use shopfront_core::progress::BatchPhase;
use shopfront_core::types::now_millis;
use shopfront_library::ContentLibrary;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::autofill::AutofillOrchestrator;
use crate::error::AutofillError;
use crate::progress::ProgressTracker;

/// Interval between wall-clock progress updates.
pub const PROGRESS_TICK: Duration = Duration::from_millis(200);

/// A template selected for the batch.
#[derive(Debug, Clone)]
pub struct BatchTemplate {
    pub id: String,
    /// Shown in failure messages; the id is used when absent.
    pub title: Option<String>,
}

impl BatchTemplate {
    fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub templates: Vec<BatchTemplate>,
    pub product: Product,
    pub discount: String,
    /// Title given to every generated design.
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    AllSucceeded,
    PartialSuccess,
    AllFailed,
}

/// Result for one template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateOutcome {
    pub template_id: String,
    pub template_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<SavedDesign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TemplateOutcome {
    pub fn succeeded(&self) -> bool {
        self.design.is_some()
    }
}

/// Aggregated result, produced only after every sub-task settled.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub status: BatchStatus,
    /// One entry per requested template, in request order.
    pub outcomes: Vec<TemplateOutcome>,
    /// `"<template>" failed: <reason>` for every failed template.
    pub messages: Vec<String>,
}

impl BatchReport {
    fn from_outcomes(templates: &[BatchTemplate], outcomes: Vec<TemplateOutcome>) -> Self {
        let messages = templates
            .iter()
            .zip(&outcomes)
            .filter_map(|(template, outcome)| {
                outcome
                    .error
                    .as_ref()
                    .map(|e| format!("\"{}\" failed: {e}", template.label()))
            })
            .collect();

        let succeeded = outcomes.iter().filter(|o| o.succeeded()).count();
        let status = if succeeded == outcomes.len() && succeeded > 0 {
            BatchStatus::AllSucceeded
        } else if succeeded > 0 {
            BatchStatus::PartialSuccess
        } else {
            BatchStatus::AllFailed
        };

        Self {
            status,
            outcomes,
            messages,
        }
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    pub fn designs(&self) -> impl Iterator<Item = &SavedDesign> {
        self.outcomes.iter().filter_map(|o| o.design.as_ref())
    }
}

/// Combine a finished job's design summary with the detailed lookup.
///
/// Detailed fields win; the job's thumbnail fills in when the lookup
/// omits it.
pub fn merge_design(job: &AutofillDesign, detail: &Design) -> SavedDesign {
    let thumb = detail
        .thumbnail
        .as_ref()
        .or(job.thumbnail.as_ref())
        .map(|t| t.url.clone());

    SavedDesign {
        id: detail.id.clone(),
        title: [detail.title.as_deref(), job.title.as_deref()]
            .into_iter()
            .flatten()
            .find(|t| !t.trim().is_empty())
            .unwrap_or(UNTITLED)
            .to_string(),
        edit_url: detail.urls.edit_url.clone(),
        created_at: now_millis(),
        thumb,
    }
}

/// Fetch the full design behind a finished job and merge the two.
pub async fn lookup_and_merge(
    platform: &dyn DesignPlatform,
    job_design: &AutofillDesign,
) -> Result<SavedDesign, AutofillError> {
    let design_id = job_design
        .id
        .as_deref()
        .ok_or(AutofillError::MissingResult("design id"))?;
    let detail = platform.get_design(design_id).await?;
    Ok(merge_design(job_design, &detail))
}

pub struct BatchAutofill {
    orchestrator: Arc<AutofillOrchestrator>,
    platform: Arc<dyn DesignPlatform>,
    library: Option<Arc<ContentLibrary>>,
    tick: Duration,
}

impl BatchAutofill {
    pub fn new(orchestrator: Arc<AutofillOrchestrator>, platform: Arc<dyn DesignPlatform>) -> Self {
        Self {
            orchestrator,
            platform,
            library: None,
            tick: PROGRESS_TICK,
        }
    }

    /// Save merged designs to `library`.
    pub fn with_library(mut self, library: Arc<ContentLibrary>) -> Self {
        self.library = Some(library);
        self
    }

    /// Run the batch to completion (or cancellation).
    ///
    /// Never fails as a whole: every problem is reported against the
    /// template it belongs to.
    pub async fn run(
        &self,
        request: &BatchRequest,
        progress: &mut ProgressTracker,
        cancel: &CancellationToken,
    ) -> BatchReport {
        let total = request.templates.len();
        progress.begin(total);
        tracing::info!(templates = total, product_id = request.product.id, "Starting batch autofill");

        if total == 0 {
            progress.finish(BatchPhase::Failed);
            return BatchReport::from_outcomes(&[], Vec::new());
        }

        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // The shared image upload polls too; keep the estimate moving meanwhile.
        let uploader = self.orchestrator.uploader();
        let upload =
            uploader.upload_from_url(&request.product.name, &request.product.image_url, cancel);
        tokio::pin!(upload);
        let uploaded = loop {
            tokio::select! {
                result = &mut upload => break result,
                _ = ticker.tick() => progress.tick(),
            }
        };

        let asset_id = match uploaded {
            Ok(asset) => asset.id,
            Err(e) => {
                tracing::warn!(error = %e, "Product image upload failed, batch aborted");
                progress.finish(BatchPhase::Failed);
                let message = e.to_string();
                let outcomes = request
                    .templates
                    .iter()
                    .map(|t| failed(t, message.clone()))
                    .collect();
                return BatchReport::from_outcomes(&request.templates, outcomes);
            }
        };

        progress.advance(BatchPhase::Polling);

        let mut results: Vec<Option<Result<SavedDesign, AutofillError>>> =
            (0..total).map(|_| None).collect();

        let mut tasks: FuturesUnordered<_> = request
            .templates
            .iter()
            .enumerate()
            .map(|(index, template)| {
                let asset_id = asset_id.as_str();
                async move { (index, self.autofill_one(template, request, asset_id, cancel).await) }
            })
            .collect();

        while !tasks.is_empty() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(pending = tasks.len(), "Batch cancelled");
                    break;
                }
                Some((index, result)) = tasks.next() => {
                    if let Err(e) = &result {
                        tracing::warn!(
                            template_id = %request.templates[index].id,
                            error = %e,
                            "Template autofill failed",
                        );
                    }
                    results[index] = Some(result);
                    progress.complete_one();
                }
                _ = ticker.tick() => progress.tick(),
            }
        }
        drop(tasks);

        let outcomes: Vec<TemplateOutcome> = request
            .templates
            .iter()
            .zip(results)
            .map(|(template, result)| match result {
                Some(Ok(design)) => TemplateOutcome {
                    template_id: template.id.clone(),
                    template_title: template.title.clone(),
                    design: Some(design),
                    error: None,
                },
                Some(Err(e)) => failed(template, e.to_string()),
                None => failed(template, AutofillError::Cancelled.to_string()),
            })
            .collect();

        let report = BatchReport::from_outcomes(&request.templates, outcomes);
        self.save_designs(&report);

        progress.finish(if report.status == BatchStatus::AllFailed {
            BatchPhase::Failed
        } else {
            BatchPhase::Done
        });

        tracing::info!(
            status = ?report.status,
            succeeded = report.success_count(),
            failed = report.failure_count(),
            "Batch autofill finished",
        );
        report
    }

    async fn autofill_one(
        &self,
        template: &BatchTemplate,
        request: &BatchRequest,
        asset_id: &str,
        cancel: &CancellationToken,
    ) -> Result<SavedDesign, AutofillError> {
        let job_design = self
            .orchestrator
            .autofill_product_with_asset(
                &template.id,
                &request.product,
                &request.discount,
                asset_id,
                request.title.clone(),
                cancel,
            )
            .await?;

        lookup_and_merge(self.platform.as_ref(), &job_design).await
    }

    fn save_designs(&self, report: &BatchReport) {
        let Some(library) = &self.library else {
            return;
        };
        if let Err(e) = library.save_many(report.designs().cloned()) {
            tracing::warn!(error = %e, "Failed to save batch designs to library");
        }
    }
}

fn failed(template: &BatchTemplate, error: String) -> TemplateOutcome {
    TemplateOutcome {
        template_id: template.id.clone(),
        template_title: template.title.clone(),
        design: None,
        error: Some(error),
    }
}
