//! Background batch runs that clients poll for progress.
//!
//! A run is spawned on the runtime and tracked by id. Clients read the
//! latest [`BatchProgress`] and, once settled, the [`BatchReport`]. A run
//! can be cancelled while in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use shopfront_pipeline::batch::{BatchAutofill, BatchReport, BatchRequest};
use shopfront_pipeline::progress::{BatchProgress, ProgressTracker};
use tokio::sync::{watch, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Finished runs are pruned once more than this many are tracked.
const MAX_TRACKED_RUNS: usize = 64;

struct BatchRun {
    progress: watch::Receiver<BatchProgress>,
    report: Arc<Mutex<Option<BatchReport>>>,
    cancel: CancellationToken,
}

impl BatchRun {
    fn report(&self) -> Option<BatchReport> {
        self.report.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// Client view of a run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRunView {
    pub id: Uuid,
    pub progress: BatchProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<BatchReport>,
}

#[derive(Default)]
pub struct BatchRegistry {
    runs: RwLock<HashMap<Uuid, BatchRun>>,
}

impl BatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `batch` for `request` and return the run id.
    pub async fn start(
        &self,
        batch: BatchAutofill,
        request: BatchRequest,
        cancel: CancellationToken,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let mut tracker = ProgressTracker::new();
        let report = Arc::new(Mutex::new(None));

        let run = BatchRun {
            progress: tracker.subscribe(),
            report: Arc::clone(&report),
            cancel: cancel.clone(),
        };

        {
            let mut runs = self.runs.write().await;
            if runs.len() >= MAX_TRACKED_RUNS {
                runs.retain(|_, run| run.report().is_none());
            }
            runs.insert(id, run);
        }

        tokio::spawn(async move {
            let result = batch.run(&request, &mut tracker, &cancel).await;
            *report.lock().unwrap_or_else(|e| e.into_inner()) = Some(result);
            tracing::debug!(batch_id = %id, "Batch run settled");
        });

        tracing::info!(batch_id = %id, "Batch run started");
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<BatchRunView> {
        let runs = self.runs.read().await;
        runs.get(&id).map(|run| BatchRunView {
            id,
            progress: *run.progress.borrow(),
            report: run.report(),
        })
    }

    /// Cancel a run. Returns `false` for unknown ids.
    pub async fn cancel(&self, id: Uuid) -> bool {
        match self.runs.read().await.get(&id) {
            Some(run) => {
                run.cancel.cancel();
                tracing::info!(batch_id = %id, "Batch run cancellation requested");
                true
            }
            None => false,
        }
    }
}
