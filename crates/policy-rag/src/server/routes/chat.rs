//! Direct chat endpoint (no retrieval)

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
use crate::types::ChatRequest;

/// POST /api/chat - Stream a single-turn completion
pub async fn chat(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    JsonBody(request): JsonBody<ChatRequest>,
) -> Result<Response> {
    let client = state.check_rate_limit(&headers, connect.map(|c| c.0))?;

    let engine = state.engine();
    let default_model = engine.config().provider.default_chat_model.clone();
    let turn = request.into_turn(&default_model, engine.default_options());

    tracing::info!("Chat request from {} using model {}", client, turn.model_id);

    let fragments = engine.chat(turn).await?;
    Ok(ndjson_response(None, fragments))
}
