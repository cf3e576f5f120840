//! Application state for the HTTP server

use axum::http::HeaderMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::RagConfig;
use crate::engine::RagEngine;
use crate::error::Result;

use super::rate_limit::{client_id, RateLimiter};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// The engine every route delegates to
    engine: Arc<RagEngine>,
    /// Per-client limiter for upload, query and chat
    rate_limiter: RateLimiter,
    started_at: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(engine: Arc<RagEngine>) -> Self {
        let rate_limiter = RateLimiter::new(&engine.config().server.rate_limit);
        Self {
            inner: Arc::new(AppStateInner {
                engine,
                rate_limiter,
                started_at: Instant::now(),
            }),
        }
    }

    pub fn engine(&self) -> &RagEngine {
        &self.inner.engine
    }

    pub fn config(&self) -> &RagConfig {
        self.inner.engine.config()
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.inner.rate_limiter
    }

    /// Time since the server state was created
    pub fn uptime(&self) -> Duration {
        self.inner.started_at.elapsed()
    }

    /// Count a request against its client's window
    pub fn check_rate_limit(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> Result<String> {
        let client = client_id(headers, peer);
        self.inner.rate_limiter.check(&client)?;
        Ok(client)
    }
}
