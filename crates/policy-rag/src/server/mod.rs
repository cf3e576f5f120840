//! HTTP server for the policy RAG engine

pub mod extract;
pub mod ndjson;
pub mod rate_limit;
pub mod routes;
pub mod state;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::RagConfig;
use crate::engine::RagEngine;
use crate::error::{Error, Result};
use state::AppState;

/// Policy RAG HTTP server
pub struct RagServer {
    config: RagConfig,
    state: AppState,
}

impl RagServer {
    /// Create a server around an existing engine
    pub fn new(engine: Arc<RagEngine>) -> Self {
        let config = engine.config().clone();
        Self {
            config,
            state: AppState::new(engine),
        }
    }

    /// Create a server backed by the configured OpenAI-compatible provider
    pub fn from_config(config: RagConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(RagEngine::with_openai(config)?)))
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let router = Router::new()
            // Health check
            .route("/health", get(health_check))
            .nest("/api", routes::api_routes(self.config.server.max_upload_size))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.server.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router.layer(cors)
        } else {
            router
        }
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.build_router();
        self.spawn_rate_limit_pruning();

        tracing::info!("Starting policy RAG server on http://{}", addr);
        tracing::info!("API documentation: http://{}/api/info", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Periodically drop request logs of idle clients
    fn spawn_rate_limit_pruning(&self) {
        let state = self.state.clone();
        let period = Duration::from_secs(self.config.server.rate_limit.window_secs.max(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                state.rate_limiter().prune();
            }
        });
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
