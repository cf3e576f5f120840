//! API routes for the policy RAG server

pub mod chat;
pub mod health;
pub mod ingest;
pub mod models;
pub mod query;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;

use crate::server::state::AppState;

/// Cap for JSON request bodies
const MAX_JSON_BODY: usize = 256 * 1024;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    let json_routes = Router::new()
        .route("/validate-key", post(models::validate_key))
        .route("/query", post(query::query_document))
        .route("/chat", post(chat::chat))
        .layer(RequestBodyLimitLayer::new(MAX_JSON_BODY));

    Router::new()
        .route("/health", get(health::api_health))
        .route("/models", get(models::list_models))
        .route("/index", get(ingest::index_status))
        // Upload - with larger body limit for documents
        .route(
            "/upload",
            post(ingest::upload_document).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .merge(json_routes)
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "policy-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Question answering over an uploaded policy document",
        "endpoints": {
            "GET /api/health": "Health, version and uptime",
            "GET /api/models": "Selectable chat models",
            "POST /api/validate-key": "Check a provider API key",
            "POST /api/upload": "Upload a PDF, DOCX, TXT or MD document (replaces the current one)",
            "GET /api/index": "What is currently indexed",
            "POST /api/query": "Ask a question (NDJSON stream: context, delta*, done|error)",
            "POST /api/chat": "Single-turn chat without retrieval (NDJSON stream)"
        }
    }))
}
