// src/middleware/rate_limit.rs - Two independent, in-memory, fixed-window
// rate limiters (spec §5): a public per-(client, route) limiter and a proxy
// per-agent/per-service limiter backed by `service_calls` count aggregates.
use std::sync::atomic::{AtomicU32, AtomicU64};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use chrono::{Duration as ChronoDuration, Utc};
use dashmap::DashMap;

use crate::constants::{
    PROXY_RATE_LIMIT_PER_AGENT, PROXY_RATE_LIMIT_PER_SERVICE, PROXY_RATE_LIMIT_WINDOW_SECS,
    PUBLIC_RATE_LIMIT_MAX_REQUESTS, PUBLIC_RATE_LIMIT_PRUNE_THRESHOLD, PUBLIC_RATE_LIMIT_WINDOW_SECS,
};
use crate::models::error::ApiError;
use crate::state::AppState;

struct WindowCounter {
    window_started_at: AtomicU64,
    count: AtomicU32,
}

impl WindowCounter {
    fn new(now: u64) -> Self {
        Self { window_started_at: AtomicU64::new(now), count: AtomicU32::new(0) }
    }
}

/// Fixed-window counter keyed on `(client-key, route-key)`. A bucket is
/// valid for one window; after expiry the counter resets rather than
/// extends (spec §3 invariant).
pub struct PublicRateLimiter {
    buckets: DashMap<(String, String), Arc<WindowCounter>>,
    max_requests: u32,
    window_secs: u64,
}

impl PublicRateLimiter {
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
            max_requests: PUBLIC_RATE_LIMIT_MAX_REQUESTS,
            window_secs: PUBLIC_RATE_LIMIT_WINDOW_SECS,
        }
    }

    pub fn check(&self, client_key: &str, route_key: &str) -> bool {
        let now = now_secs();
        let key = (client_key.to_string(), route_key.to_string());

        let counter = self.buckets.entry(key).or_insert_with(|| Arc::new(WindowCounter::new(now))).clone();

        let window_started_at = counter.window_started_at.load(Ordering::SeqCst);
        if now.saturating_sub(window_started_at) >= self.window_secs {
            counter.window_started_at.store(now, Ordering::SeqCst);
            counter.count.store(0, Ordering::SeqCst);
        }

        let count = counter.count.fetch_add(1, Ordering::SeqCst) + 1;

        if self.buckets.len() > PUBLIC_RATE_LIMIT_PRUNE_THRESHOLD {
            self.prune(now);
        }

        count <= self.max_requests
    }

    fn prune(&self, now: u64) {
        self.buckets.retain(|_, counter| now.saturating_sub(counter.window_started_at.load(Ordering::SeqCst)) < self.window_secs);
    }
}

impl Default for PublicRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-agent/per-service limiter computed from `service_calls` row counts
/// rather than an in-memory counter, matching spec §5.2.
pub struct ProxyRateLimiter;

impl ProxyRateLimiter {
    pub fn new() -> Self {
        Self
    }

    pub async fn check(&self, store: &sqlx::PgPool, agent_id: &str, service_id: uuid::Uuid) -> Result<(), ApiError> {
        let since = Utc::now() - ChronoDuration::seconds(PROXY_RATE_LIMIT_WINDOW_SECS);

        let per_service = crossfin_store::service_calls::count_for_service_since(store, agent_id, service_id, since)
            .await?;
        if per_service >= PROXY_RATE_LIMIT_PER_SERVICE {
            return Err(ApiError::RateLimited);
        }

        let per_agent = crossfin_store::service_calls::count_since(store, agent_id, since).await?;
        if per_agent >= PROXY_RATE_LIMIT_PER_AGENT {
            return Err(ApiError::RateLimited);
        }

        Ok(())
    }
}

impl Default for ProxyRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

/// `client-key`: first non-empty of CF-Connecting-IP, the leftmost token of
/// X-Forwarded-For, else "unknown".
fn extract_client_key(request: &Request) -> String {
    if let Some(cf) = request.headers().get("cf-connecting-ip").and_then(|h| h.to_str().ok()) {
        if !cf.trim().is_empty() {
            return cf.trim().to_string();
        }
    }
    if let Some(forwarded) = request.headers().get("x-forwarded-for").and_then(|h| h.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            if !first.trim().is_empty() {
                return first.trim().to_string();
            }
        }
    }
    "unknown".to_string()
}

/// `route-key`: the request path with path parameters collapsed to `:id`.
/// A segment is treated as a parameter if it looks like a UUID or is
/// entirely numeric.
fn normalize_route_key(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.is_empty() {
                segment.to_string()
            } else if segment.chars().all(|c| c.is_ascii_digit()) || uuid::Uuid::parse_str(segment).is_ok() {
                ":id".to_string()
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

pub async fn public_rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, ApiError> {
    let client_key = extract_client_key(&request);
    let route_key = normalize_route_key(request.uri().path());

    if !state.public_rate_limiter.check(&client_key, &route_key) {
        tracing::warn!(client_key = %client_key, route_key = %route_key, "rate limit exceeded");
        return Err(ApiError::RateLimited);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_documented_limit_then_rejects() {
        let limiter = PublicRateLimiter::new();
        for _ in 0..PUBLIC_RATE_LIMIT_MAX_REQUESTS {
            assert!(limiter.check("client-a", "/api/registry/search"));
        }
        assert!(!limiter.check("client-a", "/api/registry/search"));
    }

    #[test]
    fn separate_keys_have_independent_budgets() {
        let limiter = PublicRateLimiter::new();
        for _ in 0..PUBLIC_RATE_LIMIT_MAX_REQUESTS {
            assert!(limiter.check("client-a", "/api/registry/search"));
        }
        assert!(limiter.check("client-b", "/api/registry/search"));
    }

    #[test]
    fn normalizes_numeric_and_uuid_segments() {
        assert_eq!(normalize_route_key("/api/services/123"), "/api/services/:id");
        assert_eq!(
            normalize_route_key("/api/services/550e8400-e29b-41d4-a716-446655440000"),
            "/api/services/:id"
        );
        assert_eq!(normalize_route_key("/api/registry/search"), "/api/registry/search");
    }
}
