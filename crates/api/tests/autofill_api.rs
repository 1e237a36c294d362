//! Autofill endpoints: single product, batches and background batch runs.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, promo_platform};
use serde_json::json;
use shopfront_canva::fake::{AutofillScript, FakePlatform};
use shopfront_core::dataset::FieldType;

// ---------------------------------------------------------------------------
// Test: product autofill returns the merged design and remembers it
// ---------------------------------------------------------------------------

#[tokio::test]
async fn product_autofill_creates_design() {
    let platform = Arc::new(promo_platform());
    let app = common::build_test_app(Arc::clone(&platform));

    let response = post_json(
        app.clone(),
        "/api/v1/autofill/product",
        json!({ "brandTemplateId": "T1", "productId": 2, "discount": "20% off" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], "design-T1");
    assert!(json["data"]["editUrl"].as_str().unwrap().contains("design-T1"));

    let submitted = platform.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].brand_template_id, "T1");

    let library = body_json(get(app, "/api/v1/library").await).await;
    assert_eq!(library["data"][0]["id"], "design-T1");
}

// ---------------------------------------------------------------------------
// Test: a template missing promo fields is rejected before any upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn schema_mismatch_is_a_bad_request() {
    let platform = Arc::new(
        FakePlatform::new()
            .with_template("T9", "Headline only")
            .with_dataset("T9", &[("headline", FieldType::Text)]),
    );
    let app = common::build_test_app(Arc::clone(&platform));

    let response = post_json(
        app,
        "/api/v1/autofill/product",
        json!({ "brandTemplateId": "T9", "productId": 1, "discount": "10%" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "SCHEMA_MISMATCH");
    assert!(platform.upload_names().is_empty());
}

#[tokio::test]
async fn empty_discount_fails_validation() {
    let app = common::build_test_app(Arc::new(promo_platform()));
    let response = post_json(
        app,
        "/api/v1/autofill/product",
        json!({ "brandTemplateId": "T1", "productId": 1, "discount": "" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn mapping_autofill_needs_mappings_or_drafts() {
    let app = common::build_test_app(Arc::new(promo_platform()));
    let response = post_json(
        app,
        "/api/v1/autofill/mappings",
        json!({ "brandTemplateId": "T1" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Test: one rejected template makes a partial success
// ---------------------------------------------------------------------------

#[tokio::test]
async fn batch_reports_partial_success() {
    let platform = Arc::new(
        promo_platform().with_script("T2", AutofillScript::RejectSubmit("bad".to_string())),
    );
    let app = common::build_test_app(Arc::clone(&platform));

    let response = post_json(
        app.clone(),
        "/api/v1/autofill/batch",
        json!({
            "templates": [{ "id": "T1", "title": "Summer Sale" }, { "id": "T2" }],
            "productId": 3,
            "discount": "15% off",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "partial_success");

    let outcomes = json["data"]["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0]["templateId"], "T1");
    assert_eq!(outcomes[0]["design"]["id"], "design-T1");
    assert!(outcomes[1]["error"].is_string());

    // The product image is uploaded once for the whole batch.
    assert_eq!(platform.upload_names().len(), 1);

    let library = body_json(get(app, "/api/v1/library").await).await;
    assert_eq!(library["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn batch_without_templates_fails_validation() {
    let app = common::build_test_app(Arc::new(promo_platform()));
    let response = post_json(
        app,
        "/api/v1/autofill/batch",
        json!({ "templates": [], "productId": 1, "discount": "5%" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn batch_over_twenty_templates_fails_validation() {
    let platform = Arc::new(promo_platform());
    let app = common::build_test_app(Arc::clone(&platform));
    let templates: Vec<_> = (0..21).map(|i| json!({ "id": format!("T{i}") })).collect();

    let response = post_json(
        app,
        "/api/v1/autofill/batch",
        json!({ "templates": templates, "productId": 1, "discount": "5%" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert!(platform.submitted().is_empty());
}

#[tokio::test]
async fn batch_template_with_blank_id_fails_validation() {
    let app = common::build_test_app(Arc::new(promo_platform()));
    let response = post_json(
        app,
        "/api/v1/autofill/batch",
        json!({ "templates": [{ "id": "" }], "productId": 1, "discount": "5%" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: background batch runs can be polled to completion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn background_batch_settles() {
    let app = common::build_test_app(Arc::new(promo_platform()));

    let response = post_json(
        app.clone(),
        "/api/v1/autofill/batch/jobs",
        json!({ "templates": [{ "id": "T1" }, { "id": "T2" }], "productId": 1, "discount": "5%" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let mut view = serde_json::Value::Null;
    for _ in 0..200 {
        view = body_json(get(app.clone(), &format!("/api/v1/autofill/batch/jobs/{id}")).await).await;
        if !view["data"]["report"].is_null() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(view["data"]["report"]["status"], "all_succeeded");
    assert_eq!(view["data"]["progress"]["phase"], "done");
    assert_eq!(view["data"]["progress"]["percent"], 100.0);
}

#[tokio::test]
async fn cancelling_background_batch_marks_templates_cancelled() {
    let app = common::build_test_app(Arc::new(
        promo_platform().with_script("T1", AutofillScript::NeverFinish),
    ));

    let response = post_json(
        app.clone(),
        "/api/v1/autofill/batch/jobs",
        json!({ "templates": [{ "id": "T1" }], "productId": 1, "discount": "5%" }),
    )
    .await;
    let id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = delete(app.clone(), &format!("/api/v1/autofill/batch/jobs/{id}")).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let mut view = serde_json::Value::Null;
    for _ in 0..200 {
        view = body_json(get(app.clone(), &format!("/api/v1/autofill/batch/jobs/{id}")).await).await;
        if !view["data"]["report"].is_null() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(view["data"]["report"]["status"], "all_failed");
    assert_eq!(
        view["data"]["report"]["outcomes"][0]["error"],
        "Operation was cancelled"
    );
}

#[tokio::test]
async fn unknown_batch_run_is_404() {
    let app = common::build_test_app(Arc::new(promo_platform()));
    let id = uuid::Uuid::new_v4();

    let response = get(app.clone(), &format!("/api/v1/autofill/batch/jobs/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(app, &format!("/api/v1/autofill/batch/jobs/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
