use std::time::Duration;

use shopfront_canva::api::CanvaApiError;
use shopfront_canva::poll::PollError;
use shopfront_core::error::CoreError;

/// Errors from autofill, upload and design orchestration.
#[derive(Debug, thiserror::Error)]
pub enum AutofillError {
    /// Local validation failed before anything was sent.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The platform rejected a request.
    #[error(transparent)]
    Remote(#[from] CanvaApiError),

    #[error("Job did not finish within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Operation was cancelled")]
    Cancelled,

    /// The platform accepted the job but reported it failed.
    #[error("Autofill job failed: {0}")]
    JobFailed(String),

    #[error("Asset upload failed: {0}")]
    UploadFailed(String),

    #[error("Brand template {0} does not expose an autofill dataset")]
    MissingDataset(String),

    /// A finished job or design response lacked a field we depend on.
    #[error("Platform response is missing {0}")]
    MissingResult(&'static str),

    #[error("Failed to open browser: {0}")]
    Launch(#[source] std::io::Error),
}

impl From<PollError<CanvaApiError>> for AutofillError {
    fn from(err: PollError<CanvaApiError>) -> Self {
        match err {
            PollError::Timeout { elapsed } => Self::Timeout(elapsed),
            PollError::Cancelled => Self::Cancelled,
            PollError::Check(e) => Self::Remote(e),
        }
    }
}
