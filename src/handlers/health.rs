// src/handlers/health.rs - Health, readiness, and metrics endpoints
use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// Basic liveness check.
pub async fn health_check(State(_state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "crossfin-backend",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Readiness check: verifies the database is reachable.
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let start = std::time::Instant::now();

    match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "database": "healthy",
                "response_time_ms": start.elapsed().as_millis(),
            })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "readiness check failed: database unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "database": "unhealthy",
                    "error": e.to_string(),
                })),
            )
        }
    }
}

/// Prometheus metrics exposition.
pub async fn metrics(State(state): State<AppState>) -> Result<String, StatusCode> {
    if !state.config.metrics_enabled {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(state.metrics.render())
}
