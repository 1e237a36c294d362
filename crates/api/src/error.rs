use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use shopfront_canva::api::CanvaApiError;
use shopfront_canva::oauth::OAuthError;
use shopfront_core::error::CoreError;
use shopfront_library::StoreError;
use shopfront_pipeline::AutofillError;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce consistent `{error, code}` JSON
/// bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Autofill(#[from] AutofillError),

    #[error(transparent)]
    Canva(#[from] CanvaApiError),

    #[error(transparent)]
    OAuth(#[from] OAuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Request body failed `validator` checks.
    #[error("Invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

type Classified = (StatusCode, &'static str, String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core(core),
            AppError::Autofill(err) => classify_autofill(err),
            AppError::Canva(err) => classify_canva(err),
            AppError::OAuth(err) => classify_oauth(err),
            AppError::Store(err) => internal(err),
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                errors.to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => internal(msg),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal(err: &dyn std::fmt::Display) -> Classified {
    tracing::error!(error = %err, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_core(err: &CoreError) -> Classified {
    match err {
        CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::SchemaMismatch { .. } => {
            (StatusCode::BAD_REQUEST, "SCHEMA_MISMATCH", err.to_string())
        }
        CoreError::UnsupportedFieldType { .. } => {
            (StatusCode::BAD_REQUEST, "UNSUPPORTED_FIELD_TYPE", err.to_string())
        }
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Internal(msg) => internal(msg),
    }
}

fn classify_autofill(err: &AutofillError) -> Classified {
    match err {
        AutofillError::Core(core) => classify_core(core),
        AutofillError::Remote(remote) => classify_canva(remote),
        AutofillError::MissingDataset(_) => {
            (StatusCode::BAD_REQUEST, "SCHEMA_MISMATCH", err.to_string())
        }
        AutofillError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT", err.to_string()),
        AutofillError::Cancelled => {
            (StatusCode::SERVICE_UNAVAILABLE, "CANCELLED", err.to_string())
        }
        AutofillError::JobFailed(_) => (StatusCode::BAD_GATEWAY, "JOB_FAILED", err.to_string()),
        AutofillError::UploadFailed(_) => {
            (StatusCode::BAD_GATEWAY, "UPLOAD_FAILED", err.to_string())
        }
        AutofillError::MissingResult(_) => {
            (StatusCode::BAD_GATEWAY, "REMOTE_ERROR", err.to_string())
        }
        AutofillError::Launch(e) => internal(e),
    }
}

/// Platform errors keep their message so users see what went wrong.
fn classify_canva(err: &CanvaApiError) -> Classified {
    if let CanvaApiError::InvalidPath(msg) = err {
        return (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone());
    }
    tracing::warn!(error = %err, "Design platform request failed");
    match err.status() {
        Some(401) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", err.to_string()),
        Some(404) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        _ => (StatusCode::BAD_GATEWAY, "REMOTE_ERROR", err.to_string()),
    }
}

fn classify_oauth(err: &OAuthError) -> Classified {
    match err {
        OAuthError::NotConfigured => (
            StatusCode::SERVICE_UNAVAILABLE,
            "OAUTH_NOT_CONFIGURED",
            err.to_string(),
        ),
        OAuthError::Endpoint { status: 400 | 401, .. } => {
            (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", err.to_string())
        }
        OAuthError::Request(_) | OAuthError::Endpoint { .. } => {
            tracing::warn!(error = %err, "OAuth request failed");
            (StatusCode::BAD_GATEWAY, "REMOTE_ERROR", err.to_string())
        }
        OAuthError::InvalidUrl(_) => internal(err),
    }
}
