//! Coverage of the LLM-backed endpoints against the stub client: a
//! healthy call returns a fresh compression/topic result, and an
//! invalid request is rejected before it ever reaches the degradation
//! coordinator.

mod support;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn compress_returns_a_fresh_result() {
    let app = support::build_test_app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/compress")
        .header("content-type", "application/json")
        .body(Body::from(json!({"content": "a rather long session transcript worth shrinking"}).to_string()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key("x-degraded"));
    let body = body_json(response).await;
    assert!(body["summary"].as_str().unwrap().len() > 0);
    assert!(body["ratio"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn compress_rejects_empty_content() {
    let app = support::build_test_app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/compress")
        .header("content-type", "application/json")
        .body(Body::from(json!({"content": ""}).to_string()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn extract_topics_returns_lowercased_words() {
    let app = support::build_test_app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/topics")
        .header("content-type", "application/json")
        .body(Body::from(json!({"content": "Resilience Engineering Requires Careful Testing", "max": 3}).to_string()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let topics = body["topics"].as_array().unwrap();
    assert!(topics.len() <= 3);
    for topic in topics {
        let topic = topic.as_str().unwrap();
        assert_eq!(topic, topic.to_lowercase());
    }
}
