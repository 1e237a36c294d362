//! Completion estimate for multi-template batches.
//!
//! The estimate blends the fraction of finished sub-tasks (90%) with a
//! wall-clock guess (10%), is clamped to 100 and never goes backwards.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Expected duration of a batch regardless of its size.
pub const BASE_ESTIMATE: Duration = Duration::from_secs(8);
/// Expected additional duration per template in a batch.
pub const PER_TEMPLATE_ESTIMATE: Duration = Duration::from_secs(2);

/// Share of the estimate driven by finished sub-tasks.
pub const COMPLETION_WEIGHT: f64 = 90.0;
/// Share of the estimate driven by elapsed time.
pub const TIME_WEIGHT: f64 = 10.0;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Lifecycle of a batch: `Idle -> Submitting -> Polling -> Done | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPhase {
    Idle,
    Submitting,
    Polling,
    Done,
    Failed,
}

impl BatchPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether moving to `next` is a legal forward transition.
    pub fn can_advance_to(self, next: BatchPhase) -> bool {
        use BatchPhase::*;
        matches!(
            (self, next),
            (Idle, Submitting)
                | (Submitting, Polling)
                | (Submitting, Done | Failed)
                | (Polling, Done | Failed)
        )
    }
}

// ---------------------------------------------------------------------------
// Estimator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ProgressEstimator {
    total: usize,
    completed: usize,
    estimate: Duration,
    percent: f64,
}

impl ProgressEstimator {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
            estimate: BASE_ESTIMATE + PER_TEMPLATE_ESTIMATE * total as u32,
            percent: 0.0,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    /// Record one finished sub-task and return the updated estimate.
    pub fn complete_one(&mut self, elapsed: Duration) -> f64 {
        self.completed = (self.completed + 1).min(self.total);
        self.observe(elapsed)
    }

    /// Re-estimate on a clock tick.
    pub fn observe(&mut self, elapsed: Duration) -> f64 {
        self.percent = self.percent.max(self.raw(elapsed));
        self.percent
    }

    /// Force the estimate to 100 once every sub-task has settled.
    pub fn finish(&mut self) -> f64 {
        self.percent = 100.0;
        self.percent
    }

    fn raw(&self, elapsed: Duration) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        let done = self.completed as f64 / self.total as f64 * COMPLETION_WEIGHT;
        let time = (elapsed.as_secs_f64() / self.estimate.as_secs_f64() * TIME_WEIGHT)
            .min(TIME_WEIGHT);
        (done + time).min(100.0)
    }
}
