//! Live batch progress published over a [`tokio::sync::watch`] channel.

use serde::Serialize;
use shopfront_core::progress::{BatchPhase, ProgressEstimator};
use tokio::sync::watch;
use tokio::time::Instant;

/// Snapshot of a batch, as seen by subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatchProgress {
    pub phase: BatchPhase,
    /// Completion estimate in `0.0..=100.0`; never decreases.
    pub percent: f64,
    pub completed: usize,
    pub total: usize,
}

impl BatchProgress {
    fn idle() -> Self {
        Self {
            phase: BatchPhase::Idle,
            percent: 0.0,
            completed: 0,
            total: 0,
        }
    }
}

/// Owns the batch state machine and the completion estimate.
///
/// One tracker drives one batch. Subscribers obtained through
/// [`ProgressTracker::subscribe`] observe every phase change, finished
/// sub-task and clock tick.
pub struct ProgressTracker {
    tx: watch::Sender<BatchProgress>,
    estimator: ProgressEstimator,
    started: Instant,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(BatchProgress::idle());
        Self {
            tx,
            estimator: ProgressEstimator::new(0),
            started: Instant::now(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<BatchProgress> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> BatchProgress {
        *self.tx.borrow()
    }

    /// Start a batch of `total` sub-tasks and enter `Submitting`.
    pub fn begin(&mut self, total: usize) {
        self.estimator = ProgressEstimator::new(total);
        self.started = Instant::now();
        self.publish(BatchPhase::Submitting);
    }

    /// Move to `phase` if that is a legal forward transition.
    pub fn advance(&mut self, phase: BatchPhase) {
        let current = self.snapshot().phase;
        if !current.can_advance_to(phase) {
            tracing::debug!(from = ?current, to = ?phase, "Ignoring illegal phase transition");
            return;
        }
        self.publish(phase);
    }

    pub fn complete_one(&mut self) {
        self.estimator.complete_one(self.started.elapsed());
        self.publish(self.snapshot().phase);
    }

    /// Re-estimate from elapsed time.
    pub fn tick(&mut self) {
        self.estimator.observe(self.started.elapsed());
        self.publish(self.snapshot().phase);
    }

    /// Enter a terminal phase with the estimate forced to 100.
    pub fn finish(&mut self, phase: BatchPhase) {
        self.estimator.finish();
        self.advance(phase);
        // `advance` ignores the call if already terminal; still publish 100.
        self.publish(self.snapshot().phase);
    }

    fn publish(&self, phase: BatchPhase) {
        self.tx.send_replace(BatchProgress {
            phase,
            percent: self.estimator.percent(),
            completed: self.estimator.completed(),
            total: self.estimator.total(),
        });
    }
}
