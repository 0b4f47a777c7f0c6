//! Integration tests for the `/api/v1/jobs` endpoints.

mod common;

use std::sync::atomic::Ordering;

use axum::http::StatusCode;
use common::{body_json, build_test_app, default_app, get, post_json, MockCatalog, MockRunner};
use serde_json::json;

#[tokio::test]
async fn submitting_a_batch_returns_201_with_the_snapshot() {
    let app = default_app();
    let response = post_json(app, "/api/v1/jobs", json!({ "repo_ids": [3, 1, 2] })).await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let batch = body_json(response).await;
    // The key and id list are canonical: sorted, deduplicated.
    assert_eq!(batch["request_key"], "1,2,3");
    assert_eq!(batch["repo_ids"], json!([1, 2, 3]));
    assert_eq!(batch["state"], "pending");
    assert_eq!(
        batch["backend_job_ids"],
        json!(["job-1", "job-2", "job-3"])
    );
}

#[tokio::test]
async fn resubmission_of_the_same_set_is_idempotent() {
    let runner = MockRunner::ok();
    let app = build_test_app(MockCatalog::ok(), runner.clone());

    let first = post_json(app.clone(), "/api/v1/jobs", json!({ "repo_ids": [3, 1, 2] })).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    // Different order, same set: dedup hit, no second backend call.
    let second = post_json(app, "/api/v1/jobs", json!({ "repo_ids": [1, 2, 3] })).await;
    assert_eq!(second.status(), StatusCode::OK);

    let batch = body_json(second).await;
    assert_eq!(batch["request_key"], "1,2,3");
    assert_eq!(runner.submit_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_repo_ids_is_a_validation_error() {
    let app = default_app();
    let response = post_json(app, "/api/v1/jobs", json!({ "repo_ids": [] })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn failed_backend_submission_maps_to_502_but_records_the_batch() {
    let runner = MockRunner::failing();
    let app = build_test_app(MockCatalog::ok(), runner.clone());

    let response = post_json(app.clone(), "/api/v1/jobs", json!({ "repo_ids": [7] })).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = body_json(response).await;
    assert_eq!(json["code"], "SUBMISSION_ERROR");

    // The batch is still recorded as pending with no backend job ids.
    let response = get(app, "/api/v1/jobs/7").await;
    assert_eq!(response.status(), StatusCode::OK);
    let batch = body_json(response).await;
    assert_eq!(batch["state"], "pending");
    assert_eq!(batch["backend_job_ids"], json!([]));
}

#[tokio::test]
async fn get_returns_the_current_snapshot() {
    let app = default_app();

    post_json(app.clone(), "/api/v1/jobs", json!({ "repo_ids": [42] })).await;

    let response = get(app, "/api/v1/jobs/42").await;
    assert_eq!(response.status(), StatusCode::OK);

    let batch = body_json(response).await;
    assert_eq!(batch["request_key"], "42");
    assert_eq!(batch["state"], "pending");
}

#[tokio::test]
async fn unknown_request_key_is_404() {
    let app = default_app();
    let response = get(app, "/api/v1/jobs/99").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn malformed_request_key_is_404_not_500() {
    let app = default_app();
    let response = get(app, "/api/v1/jobs/not-a-key").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn events_stream_opens_for_a_pending_batch() {
    let app = default_app();

    post_json(app.clone(), "/api/v1/jobs", json!({ "repo_ids": [5] })).await;

    let response = get(app, "/api/v1/jobs/5/events").await;
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .expect("SSE response must have a content type")
        .to_str()
        .unwrap();
    assert!(
        content_type.starts_with("text/event-stream"),
        "expected SSE content type, got: {content_type}"
    );
    // The body is an open stream (connected event + keep-alives); it is
    // deliberately not consumed here.
}

#[tokio::test]
async fn events_stream_for_unknown_key_is_404() {
    let app = default_app();
    let response = get(app, "/api/v1/jobs/12345/events").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
