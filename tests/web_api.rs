// JSON API tests: drive the router in-process with tower's oneshot.

#![cfg(feature = "web")]

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use youtoxic::classify::Pipeline;
use youtoxic::web::{build_router, AppState};

use common::{ConstantClassifier, FailingClassifier, FailingUlm, FakeUlm};

fn app() -> axum::Router {
    app_with(common::pipeline())
}

fn app_with(pipeline: Pipeline) -> axum::Router {
    build_router(AppState {
        pipeline: Arc::new(pipeline),
    })
}

async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
    post_json_to(app(), uri, body).await
}

async fn post_json_to(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn health_returns_ok() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["threshold"], serde_json::json!(0.4));
}

#[tokio::test]
async fn classifications_return_requested_types_in_fixed_order() {
    let (status, json) = post_json(
        "/api/classifications",
        serde_json::json!({
            "texts": ["foo bar baz fiz", "@someone you idiot"],
            "types": ["insult", "toxic"]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["pred_types"], serde_json::json!(["Toxicity", "Insult"]));
    assert_eq!(
        json["classes"]["Toxicity"],
        serde_json::json!(["Not toxic", "Toxic"])
    );
    assert_eq!(
        json["classes"]["Insult"],
        serde_json::json!(["Not an insult", "Insult"])
    );
    assert_eq!(json["preds"]["Toxicity"][1], serde_json::json!(0.953));
    // Original texts are echoed back, not the preprocessed ones
    assert_eq!(json["texts"][1], "@someone you idiot");
    assert!(json["preds"].get("Obscenity").is_none());
}

#[tokio::test]
async fn preprocessing_strips_mentions_before_scoring() {
    // "@idiot" is a mention: stripped by default, scored when preprocess is off
    let (_, cleaned) = post_json(
        "/api/classifications",
        serde_json::json!({ "texts": ["hello @idiot"], "types": ["toxic"] }),
    )
    .await;
    assert_eq!(cleaned["classes"]["Toxicity"][0], "Not toxic");

    let (_, raw) = post_json(
        "/api/classifications",
        serde_json::json!({ "texts": ["hello @idiot"], "types": ["toxic"], "preprocess": false }),
    )
    .await;
    assert_eq!(raw["classes"]["Toxicity"][0], "Toxic");
}

#[tokio::test]
async fn unknown_type_is_bad_request() {
    let (status, json) = post_json(
        "/api/classifications",
        serde_json::json!({ "texts": ["foo"], "types": ["threat"] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("threat"));
}

#[tokio::test]
async fn empty_types_is_bad_request() {
    let (status, _) = post_json(
        "/api/classifications",
        serde_json::json!({ "texts": ["foo"], "types": [] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn single_text_classification() {
    let (status, json) = post_json(
        "/api/text-classifications",
        serde_json::json!({ "text": "damn", "types": ["obscene", "identity"] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["pred_types"],
        serde_json::json!(["Identity hate", "Obscenity"])
    );
    assert_eq!(json["classes"]["Obscenity"], "Obscene");
    assert_eq!(json["classes"]["Identity hate"], "Not prejudice");
    assert_eq!(json["text"], "damn");
}

#[tokio::test]
async fn ulm_classifications() {
    let (status, json) = post_json(
        "/api/ulm-classifications",
        serde_json::json!({ "texts": ["nice", "You idiot"] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["classes"], serde_json::json!(["Not toxic", "Toxic"]));
    assert_eq!(json["preds"][1], serde_json::json!(0.982));
}

#[tokio::test]
async fn inference_failure_is_internal_error() {
    let failing = || common::pipeline_with(Box::new(FailingClassifier), Box::new(FakeUlm));

    let (status, json) = post_json_to(
        app_with(failing()),
        "/api/classifications",
        serde_json::json!({ "texts": ["foo"], "types": ["toxic", "insult"] }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Classification failed");

    let (status, json) = post_json_to(
        app_with(failing()),
        "/api/text-classifications",
        serde_json::json!({ "text": "foo", "types": ["toxic"] }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Classification failed");
}

#[tokio::test]
async fn ulm_failure_is_internal_error() {
    let pipeline =
        common::pipeline_with(Box::new(ConstantClassifier(0.0)), Box::new(FailingUlm));
    let (status, json) = post_json_to(
        app_with(pipeline),
        "/api/ulm-classifications",
        serde_json::json!({ "texts": ["nice"] }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Classification failed");
}
