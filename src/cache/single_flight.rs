// Generic single-flight cache: the "value / expiry / optional in-flight
// handle" contract shared by every upstream price cache.
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, Mutex};

use crate::models::error::ApiError;

struct State<T: Clone> {
    value: Option<T>,
    expiry: Option<Instant>,
    inflight: Option<broadcast::Sender<Result<T, String>>>,
}

/// A process-wide cached value with success/failure TTLs and request
/// coalescing: concurrent readers after expiry await one in-flight fetch
/// rather than issuing their own.
pub struct Cached<T: Clone + Send + Sync + 'static> {
    state: Mutex<State<T>>,
    success_ttl: Duration,
    failure_ttl: Duration,
}

impl<T: Clone + Send + Sync + 'static> Cached<T> {
    pub fn new(success_ttl: Duration, failure_ttl: Duration) -> Self {
        Self {
            state: Mutex::new(State { value: None, expiry: None, inflight: None }),
            success_ttl,
            failure_ttl,
        }
    }

    /// Seed the cache with a compiled-in baseline value, as-if freshly
    /// fetched, used by caches whose fallback chain ends in a constant.
    pub async fn seed(&self, value: T) {
        let mut state = self.state.lock().await;
        state.value = Some(value);
        state.expiry = Some(Instant::now() + self.success_ttl);
    }

    pub async fn peek(&self) -> Option<T> {
        self.state.lock().await.value.clone()
    }

    /// Return the cached value if fresh; otherwise coalesce with any
    /// in-flight fetch, or start a new one via `fetch`. On fetch failure,
    /// falls back to the last known value (even if stale) before
    /// propagating the error.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<T, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send,
    {
        let mut rx = {
            let mut state = self.state.lock().await;

            if let Some(expiry) = state.expiry {
                if expiry > Instant::now() {
                    if let Some(v) = &state.value {
                        return Ok(v.clone());
                    }
                }
            }

            if let Some(sender) = &state.inflight {
                sender.subscribe()
            } else {
                let (tx, rx) = broadcast::channel(1);
                state.inflight = Some(tx);
                drop(state);
                self.run_fetch(fetch).await;
                rx
            }
        };

        match rx.recv().await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) | Err(_) => {
                let state = self.state.lock().await;
                state.value.clone().ok_or_else(|| {
                    ApiError::UpstreamUnavailable("no cached value available".into())
                })
            }
        }
    }

    async fn run_fetch<F, Fut>(&self, fetch: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send,
    {
        let result = fetch().await;

        let mut state = self.state.lock().await;
        let sender = state.inflight.take();

        match &result {
            Ok(value) => {
                state.value = Some(value.clone());
                state.expiry = Some(Instant::now() + self.success_ttl);
            }
            Err(_) => {
                state.expiry = Some(Instant::now() + self.failure_ttl);
            }
        }

        if let Some(sender) = sender {
            let broadcast_result = result.map_err(|e| e.to_string());
            let _ = sender.send(broadcast_result);
        }
    }
}

/// Shared convenience: wrap a `Cached<T>` in an `Arc` for handler state.
pub type SharedCached<T> = Arc<Cached<T>>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn concurrent_readers_issue_one_fetch() {
        let cache = Arc::new(Cached::<i32>::new(Duration::from_secs(60), Duration::from_secs(1)));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch(|| async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(42)
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn falls_back_to_last_known_value_on_failure() {
        let cache = Cached::<i32>::new(Duration::from_millis(10), Duration::from_millis(10));
        cache.seed(7).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        let result = cache
            .get_or_fetch(|| async { Err(ApiError::UpstreamUnavailable("down".into())) })
            .await;

        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn propagates_error_with_no_prior_value() {
        let cache = Cached::<i32>::new(Duration::from_secs(60), Duration::from_secs(1));
        let result = cache
            .get_or_fetch(|| async { Err(ApiError::UpstreamUnavailable("down".into())) })
            .await;
        assert!(result.is_err());
    }
}
