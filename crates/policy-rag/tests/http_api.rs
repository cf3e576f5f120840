//! HTTP routes exercised in-process with `tower::ServiceExt::oneshot`

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use common::{engine_with, test_config, EchoGenerator, KeywordEmbedder, POLICY_TEXT};
use policy_rag::config::RagConfig;
use policy_rag::server::RagServer;
use policy_rag::StreamEvent;

const BOUNDARY: &str = "policy-rag-test-boundary";

fn app_with(config: RagConfig) -> Router {
    let engine = engine_with(
        config,
        Arc::new(KeywordEmbedder::default()),
        Arc::new(EchoGenerator::default()),
    );
    RagServer::new(Arc::new(engine)).build_router()
}

fn app() -> Router {
    app_with(test_config(40, 10))
}

fn multipart_upload(filename: &str, content: &str, api_key: Option<&str>) -> Request<Body> {
    let mut body = String::new();
    if let Some(key) = api_key {
        body.push_str(&format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"api_key\"\r\n\r\n{key}\r\n",
            b = BOUNDARY,
            key = key
        ));
    }
    body.push_str(&format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
         Content-Type: text/plain\r\n\r\n{c}\r\n--{b}--\r\n",
        b = BOUNDARY,
        f = filename,
        c = content
    ));

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_post(uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_events(response: axum::response::Response) -> Vec<StreamEvent> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_liveness_and_health() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_secs"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_models_catalog() {
    let response = app().oneshot(get("/api/models")).await.unwrap();
    let body = body_json(response).await;
    let ids: Vec<&str> = body["models"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["gpt-4.1-mini", "gpt-4", "gpt-3.5-turbo", "gpt-4-turbo"]);
}

#[tokio::test]
async fn test_validate_key() {
    let response = app()
        .oneshot(json_post("/api/validate-key", json!({"api_key": "sk-valid"})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["model_tested"], "gpt-3.5-turbo");

    let response = app()
        .oneshot(json_post("/api/validate-key", json!({"api_key": "sk-other"})))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["valid"], false);
}

#[tokio::test]
async fn test_query_before_upload_is_conflict() {
    let response = app()
        .oneshot(json_post(
            "/api/query",
            json!({"question": "What is my deductible?", "api_key": "sk-test"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"]["type"], "empty_index");
}

#[tokio::test]
async fn test_upload_then_streamed_query() {
    let app = app();

    let response = app
        .clone()
        .oneshot(multipart_upload("policy.txt", POLICY_TEXT, Some("sk-test")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["num_chunks"], 3);
    assert_eq!(body["generation"], 1);

    let response = app
        .clone()
        .oneshot(get("/api/index"))
        .await
        .unwrap();
    let status = body_json(response).await;
    assert_eq!(status["document"]["filename"], "policy.txt");

    let response = app
        .oneshot(json_post(
            "/api/query",
            json!({"question": "What is my deductible?", "k": 1, "api_key": "sk-test"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/x-ndjson"
    );

    let events = body_events(response).await;
    match &events[0] {
        StreamEvent::Context { chunks, scores } => {
            assert_eq!(chunks, &vec!["Collision coverage deductible is $500. R".to_string()]);
            assert_eq!(scores.len(), 1);
        }
        other => panic!("expected context first, got {:?}", other),
    }
    assert_eq!(events.last(), Some(&StreamEvent::Done));

    let answer: String = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::Delta { text } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert!(answer.contains("$500"));
}

#[tokio::test]
async fn test_upload_errors() {
    let response = app()
        .oneshot(multipart_upload("claims.xlsx", "a,b", Some("sk-test")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let response = app()
        .oneshot(multipart_upload("blank.txt", "   ", Some("sk-test")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"]["type"], "empty_document");

    let response = app()
        .oneshot(multipart_upload("policy.txt", POLICY_TEXT, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_accepts_key_header() {
    let mut request = multipart_upload("policy.txt", POLICY_TEXT, None);
    request
        .headers_mut()
        .insert("x-api-key", "sk-test".parse().unwrap());

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_chat_streams_and_validates() {
    let response = app()
        .oneshot(json_post(
            "/api/chat",
            json!({
                "developer_message": "Answer in one word.",
                "user_message": "Hello",
                "model": "gpt-4",
                "api_key": "sk-test"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let events = body_events(response).await;
    assert!(matches!(events.first(), Some(StreamEvent::Delta { .. })));
    assert_eq!(events.last(), Some(&StreamEvent::Done));

    let response = app()
        .oneshot(json_post(
            "/api/chat",
            json!({
                "developer_message": "Answer in one word.",
                "user_message": "Hello",
                "model": "not-a-model",
                "api_key": "sk-test"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["type"], "invalid_input");
}

#[tokio::test]
async fn test_rate_limit_per_client() {
    let mut config = test_config(40, 10);
    config.server.rate_limit.enabled = true;
    config.server.rate_limit.max_requests = 2;
    let app = app_with(config);

    let chat = |client: &str| {
        let mut request = json_post(
            "/api/chat",
            json!({
                "developer_message": "Be brief.",
                "user_message": "Hi",
                "api_key": "sk-test"
            }),
        );
        request
            .headers_mut()
            .insert("x-forwarded-for", client.parse().unwrap());
        request
    };

    for _ in 0..2 {
        let response = app.clone().oneshot(chat("198.51.100.4")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.clone().oneshot(chat("198.51.100.4")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(response).await["error"]["type"], "rate_limited");

    let response = app.oneshot(chat("198.51.100.5")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_json_uses_error_shape() {
    for uri in ["/api/query", "/api/chat", "/api/validate-key"] {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"question\": "))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        let body = body_json(response).await;
        assert_eq!(body["error"]["type"], "invalid_input", "{}", uri);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Invalid JSON body"));
    }

    // Well-formed JSON missing a required field
    let response = app()
        .oneshot(json_post("/api/query", json!({"question": "Is towing covered?"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["type"], "invalid_input");
}
