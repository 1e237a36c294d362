//! Tests for `AppError` -> HTTP response mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use shopfront_api::error::AppError;
use shopfront_canva::api::CanvaApiError;
use shopfront_core::error::CoreError;
use shopfront_pipeline::AutofillError;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let (status, json) = error_to_response(AppError::Core(CoreError::NotFound {
        entity: "Product",
        id: "42".to_string(),
    }))
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn timeout_maps_to_gateway_timeout() {
    let err = AutofillError::Timeout(std::time::Duration::from_secs(120));
    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json["code"], "TIMEOUT");
    assert_eq!(json["error"], "Job did not finish within 120s");
}

#[tokio::test]
async fn failed_job_keeps_platform_message() {
    let err = AutofillError::JobFailed("Template is locked".to_string());
    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "JOB_FAILED");
    assert_eq!(json["error"], "Autofill job failed: Template is locked");
}

#[tokio::test]
async fn platform_unauthorized_maps_to_401() {
    let err = CanvaApiError::Api {
        status: 401,
        code: None,
        message: "token expired".to_string(),
    };
    let (status, _) = error_to_response(AutofillError::from(err).into()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unusable_resource_id_is_a_bad_request() {
    let err = CanvaApiError::InvalidPath("\"..\" is not a valid path segment".to_string());
    let (status, json) = error_to_response(AppError::Canva(err)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn internal_errors_hide_details() {
    let (status, json) = error_to_response(AppError::InternalError("disk on fire".into())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}
