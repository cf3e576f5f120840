//! Question endpoint: retrieval plus a streamed grounded answer

use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    response::Response,
};
use std::net::SocketAddr;

use crate::error::Result;
use crate::server::extract::JsonBody;
use crate::server::ndjson::ndjson_response;
use crate::server::state::AppState;
use crate::types::{QueryRequest, StreamEvent};

/// POST /api/query - Answer a question about the indexed document
///
/// Failures before the answer starts are plain JSON errors; after that the
/// NDJSON stream carries a terminal `error` event instead.
pub async fn query_document(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    JsonBody(request): JsonBody<QueryRequest>,
) -> Result<Response> {
    let client = state.check_rate_limit(&headers, connect.map(|c| c.0))?;
    tracing::info!("Query from {}: \"{}\"", client, request.question);

    let response = state.engine().query(request).await?;

    let lead = StreamEvent::Context {
        chunks: response.context,
        scores: response.scores,
    };
    Ok(ndjson_response(Some(lead), response.answer))
}
