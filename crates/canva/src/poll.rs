//! Job polling loop.
//!
//! [`poll`] repeatedly invokes a check function until the returned value
//! reports a terminal [`JobStatus`], the configured timeout elapses, or
//! the [`CancellationToken`] is triggered. A failing check is returned
//! immediately and never retried.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::models::JobState;

/// Tunable parameters for the polling loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between the first and second check.
    pub interval: Duration,
    /// Upper bound on the delay between checks.
    pub max_interval: Duration,
    /// Factor by which the delay grows after each check (1.0 = fixed).
    pub multiplier: f64,
    /// Give up once this much time has passed since the first check.
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            max_interval: Duration::from_secs(5),
            multiplier: 1.0,
            timeout: Duration::from_secs(120),
        }
    }
}

impl PollConfig {
    /// Fixed-interval config.
    pub fn fixed(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            max_interval: interval,
            multiplier: 1.0,
            timeout,
        }
    }
}

/// Errors from [`poll`].
#[derive(Debug, thiserror::Error)]
pub enum PollError<E> {
    /// No terminal state was reached before the timeout.
    #[error("Job did not finish within {elapsed:?}")]
    Timeout { elapsed: Duration },

    #[error("Polling was cancelled")]
    Cancelled,

    /// The check function itself failed.
    #[error(transparent)]
    Check(E),
}

/// Calculate the next delay from the current delay and config.
///
/// The result stays between [`PollConfig::interval`] and
/// [`PollConfig::max_interval`].
pub fn next_interval(current: Duration, config: &PollConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).clamp(config.interval, config.max_interval.max(config.interval))
}

/// Poll `check` until it yields a terminal job state.
///
/// Returns the first terminal value, whether it reports success or
/// failure; callers decide what a failed job means for them.
pub async fn poll<T, E, F, Fut>(
    mut check: F,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<T, PollError<E>>
where
    T: JobState,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let started = Instant::now();
    let mut delay = config.interval;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let value = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PollError::Cancelled),
            result = check() => result.map_err(PollError::Check)?,
        };

        if value.job_status().is_terminal() {
            tracing::debug!(
                attempt,
                elapsed_ms = started.elapsed().as_millis() as u64,
                status = ?value.job_status(),
                "Job reached terminal state",
            );
            return Ok(value);
        }

        let elapsed = started.elapsed();
        if elapsed >= config.timeout {
            tracing::warn!(attempt, elapsed_ms = elapsed.as_millis() as u64, "Polling timed out");
            return Err(PollError::Timeout { elapsed });
        }

        // Never sleep past the deadline; the next check is the last chance.
        let wait = delay.min(config.timeout - elapsed);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PollError::Cancelled),
            _ = tokio::time::sleep(wait) => {}
        }

        delay = next_interval(delay, config);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use assert_matches::assert_matches;

    use super::*;
    use crate::models::JobStatus;

    #[derive(Debug, PartialEq)]
    struct FakeJob {
        status: JobStatus,
        result: Option<&'static str>,
    }

    impl JobState for FakeJob {
        fn job_status(&self) -> JobStatus {
            self.status
        }
    }

    fn in_progress() -> FakeJob {
        FakeJob {
            status: JobStatus::InProgress,
            result: None,
        }
    }

    #[test]
    fn fixed_interval_stays_fixed() {
        let config = PollConfig::default();
        let d = next_interval(Duration::from_secs(1), &config);
        assert_eq!(d, Duration::from_secs(1));
    }

    #[test]
    fn backoff_doubles_and_clamps() {
        let config = PollConfig {
            interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(2),
            multiplier: 2.0,
            timeout: Duration::from_secs(60),
        };
        let mut delay = config.interval;
        let expected = [500, 1000, 2000, 2000];
        for &ms in &expected {
            assert_eq!(delay, Duration::from_millis(ms));
            delay = next_interval(delay, &config);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn returns_terminal_value_after_n_plus_one_calls() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result = poll(
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n <= 3 {
                        Ok::<_, String>(in_progress())
                    } else {
                        Ok(FakeJob {
                            status: JobStatus::Success,
                            result: Some("X"),
                        })
                    }
                }
            },
            &PollConfig::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(result.result, Some("X"));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_status_is_terminal() {
        let result = poll(
            || async {
                Ok::<_, String>(FakeJob {
                    status: JobStatus::Failed,
                    result: None,
                })
            },
            &PollConfig::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(result.status, JobStatus::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_never_terminal() {
        let config = PollConfig::fixed(Duration::from_secs(1), Duration::from_secs(5));
        let started = Instant::now();

        let result = poll(
            || async { Ok::<_, String>(in_progress()) },
            &config,
            &CancellationToken::new(),
        )
        .await;

        assert_matches!(result, Err(PollError::Timeout { elapsed }) if elapsed >= Duration::from_secs(5));
        assert!(started.elapsed() < Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn check_error_propagates_without_retry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<FakeJob, _> = poll(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err::<FakeJob, _>("boom".to_string()) }
            },
            &PollConfig::default(),
            &CancellationToken::new(),
        )
        .await;

        assert_matches!(result, Err(PollError::Check(msg)) if msg == "boom");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_polling() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = poll(
            || async { Ok::<_, String>(in_progress()) },
            &PollConfig::default(),
            &cancel,
        )
        .await;

        assert_matches!(result, Err(PollError::Cancelled));
    }
}
