//! Per-client sliding-window rate limiting

use axum::http::HeaderMap;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;
use crate::error::{Error, Result};

/// In-memory request log keyed by client address
#[derive(Debug)]
pub struct RateLimiter {
    enabled: bool,
    max_requests: usize,
    window: Duration,
    requests: DashMap<String, VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_secs),
            requests: DashMap::new(),
        }
    }

    /// Record a request from `client`, failing once the window is full
    pub fn check(&self, client: &str) -> Result<()> {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let mut log = self.requests.entry(client.to_string()).or_default();
        while let Some(oldest) = log.front() {
            if now.saturating_duration_since(*oldest) >= self.window {
                log.pop_front();
            } else {
                break;
            }
        }

        if log.len() >= self.max_requests {
            tracing::warn!("Rate limit exceeded for {}", client);
            return Err(Error::RateLimited {
                limit: self.max_requests,
                window_secs: self.window.as_secs(),
            });
        }

        log.push_back(now);
        Ok(())
    }

    /// Number of clients with a request log
    pub fn tracked_clients(&self) -> usize {
        self.requests.len()
    }

    /// Forget clients whose every request has aged out of the window
    pub fn prune(&self) {
        let now = Instant::now();
        let window = self.window;
        self.requests.retain(|_, log| {
            log.back()
                .is_some_and(|last| now.saturating_duration_since(*last) < window)
        });
    }
}

/// Client identity: first `X-Forwarded-For` entry, else the peer IP
pub fn client_id(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (forwarded, peer) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}
