//! Health endpoint

use axum::{extract::State, Json};

use crate::server::state::AppState;
use crate::types::response::HealthResponse;

/// GET /api/health - Liveness with version and uptime
pub async fn api_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime().as_secs_f64(),
    })
}
