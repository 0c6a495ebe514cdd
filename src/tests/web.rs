use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower::ServiceExt;

use crate::app::AppLocal;
use crate::config::Config;
use crate::web;

fn create_router() -> Router {
    let config = Config::default();
    let server_config = config.server.clone();
    web::router(Arc::new(RwLock::new(AppLocal::new(config))), &server_config)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post_raw(router, uri, body.to_string()).await
}

async fn post_raw(router: &Router, uri: &str, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    send(router, request).await
}

#[tokio::test(flavor = "multi_thread")]
async fn test_index() {
    let router = create_router();
    let (status, body) = get(&router, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "online");
    assert_eq!(body["endpoints"]["ask"], "POST /ask");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_upload_and_ask() {
    let router = create_router();

    let (status, body) = post(
        &router,
        "/upload",
        json!({"title": "Cats", "content": "the cat sat on the mat"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["document"]["id"], 1);
    assert_eq!(body["document"]["length"], 22);
    assert_eq!(body["statistics"]["total_documents"], 1);

    let (status, body) = post(&router, "/ask", json!({"question": "where did the cat sit"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["source"]["match_type"], "vector");
    assert_eq!(body["source"]["document_id"], 1);
    assert_eq!(body["source"]["title"], "Cats");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ask_keyword_fallback() {
    let router = create_router();
    post(
        &router,
        "/upload",
        json!({"title": "Mat", "content": "exn jka lgu the cat sat on the mat"}),
    )
    .await;

    let (status, body) = post(&router, "/ask", json!({"question": "the cat"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "keyword_match");
    assert_eq!(body["confidence"], 0.5);
    assert_eq!(body["source"]["match_type"], "keyword");
    assert_eq!(body["source"]["matched_keywords"], json!(["cat", "the"]));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ask_without_documents() {
    let router = create_router();
    let (status, body) = post(&router, "/ask", json!({"question": "anything?"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "no_documents");
    assert_eq!(body["confidence"], 0.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_validation_errors() {
    let router = create_router();

    let (status, body) = post(&router, "/upload", json!({"title": "Empty", "content": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "failed");

    let (status, body) = post(&router, "/ask", json!({"question": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "failed");

    let (status, body) = post_raw(&router, "/upload", "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "request body is empty or malformed");

    let (status, _) = post_raw(&router, "/ask", String::new()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_documents_and_clear() {
    let router = create_router();
    post(&router, "/upload", json!({"title": "One", "content": "first document"})).await;
    post(&router, "/upload", json!({"content": "second document"})).await;

    let (status, body) = get(&router, "/documents").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["documents"][1]["title"], "Untitled document 2");
    assert!(body["documents"][0].get("embedding").is_none());

    let (status, body) = post(&router, "/clear", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cleared"], 2);

    let (_, body) = get(&router, "/documents").await;
    assert_eq!(body["count"], 0);

    let (_, body) = post(&router, "/upload", json!({"content": "third document"})).await;
    assert_eq!(body["document"]["id"], 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_health_status_and_probe() {
    let router = create_router();
    post(&router, "/ask", json!({"question": "hello"})).await;

    let (status, body) = get(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["memory_usage"], 0);

    let (status, body) = get(&router, "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["system"]["queries_count"], 1);
    assert_eq!(body["system"]["embedding_dimensions"], 384);

    let (status, body) = get(&router, "/embedding_test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["embedding"]["dimensions"], 384);
    assert_eq!(body["embedding"]["sample_values"].as_array().map(Vec::len), Some(10));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_route() {
    let router = create_router();
    let (status, body) = get(&router, "/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
    assert!(body["available_endpoints"]
        .as_array()
        .unwrap()
        .contains(&json!("POST /upload")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wrong_method() {
    let router = create_router();

    let (status, body) = get(&router, "/ask").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["status"], 405);
    assert_eq!(body["allowed_methods"], json!(["GET", "POST"]));

    let (status, body) = post(&router, "/health", json!({})).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["status"], 405);
}
