use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use pretty_assertions::assert_eq;
use prompt_relay::{
    Error,
    records::{MemoryRecordStore, RecordStore},
    response::GenerationResult,
    server::{self, handlers::AppState},
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

mod common;
use common::{
    CASE_ID, CASE_TEMPLATE, MockTransport, case_record, classification_json, create_test_invoker,
};

fn create_test_app(transport: MockTransport) -> (Router, MemoryRecordStore) {
    let (invoker, store) = create_test_invoker(transport);
    let app = server::router(AppState {
        invoker: Arc::new(invoker),
    });
    (app, store)
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_generation_endpoint_updates_record() {
    let (app, store) = create_test_app(MockTransport::new().with_text(&classification_json()));

    let response = app
        .oneshot(post(&format!(
            "/templates/{}/records/{}/generations",
            CASE_TEMPLATE, CASE_ID
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["output"]["caseType"], "Mechanical");
    assert_eq!(body["record"]["id"], CASE_ID);
    assert_eq!(body["record"]["fields"]["Reason"], "Installation");
    assert!(body["invocation_id"].is_string());

    let stored = store.get(CASE_ID).await.unwrap();
    assert_eq!(stored.get_str("Type"), Some("Mechanical"));
}

#[tokio::test]
async fn test_generation_endpoint_unknown_record() {
    let (app, _store) = create_test_app(MockTransport::new());

    let response = app
        .oneshot(post(&format!(
            "/templates/{}/records/500missing/generations",
            CASE_TEMPLATE
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("500missing"));
}

#[tokio::test]
async fn test_generation_endpoint_unknown_template() {
    let (app, _store) = create_test_app(MockTransport::new());

    let response = app
        .oneshot(post(&format!("/templates/nope/records/{}/generations", CASE_ID)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generation_endpoint_upstream_failure() {
    let (app, store) = create_test_app(MockTransport::new().with_error(Error::Transport {
        status: 500,
        body: "boom".to_string(),
    }));

    let response = app
        .oneshot(post(&format!(
            "/templates/{}/records/{}/generations",
            CASE_TEMPLATE, CASE_ID
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("500"));
    assert_eq!(store.get(CASE_ID).await.unwrap(), case_record(CASE_ID));
}

#[tokio::test]
async fn test_preview_endpoint() {
    let transport = MockTransport::new().with_response(GenerationResult {
        generations: vec![],
        prompt: Some("Resolved prompt text".to_string()),
    });
    let (app, _store) = create_test_app(transport);

    let response = app
        .oneshot(post(&format!(
            "/templates/{}/records/{}/preview",
            CASE_TEMPLATE, CASE_ID
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["prompt"], "Resolved prompt text");
}

#[tokio::test]
async fn test_health_lists_templates() {
    let (app, _store) = create_test_app(MockTransport::new());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["templates"][0], CASE_TEMPLATE);
}

#[tokio::test]
async fn test_generation_endpoint_rejects_get() {
    let (app, _store) = create_test_app(MockTransport::new());

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/templates/{}/records/{}/generations",
                    CASE_TEMPLATE, CASE_ID
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
