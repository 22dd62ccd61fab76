// Admin-gated maintenance endpoints, behind the x-admin-token header.
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};

use crate::models::error::ApiError;
use crate::services::{registry_seed, snapshot_writer};
use crate::state::AppState;

fn check_admin_token(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let configured = state.config.admin_token.as_deref().ok_or(ApiError::Forbidden)?;
    let provided = headers.get("x-admin-token").and_then(|h| h.to_str().ok()).unwrap_or("");
    if provided.is_empty() || provided != configured {
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}

pub async fn reseed_registry(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    check_admin_token(&state, &headers)?;
    registry_seed::seed(&state.db).await?;
    Ok(Json(json!({ "status": "reseeded" })))
}

pub async fn trigger_snapshot(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    check_admin_token(&state, &headers)?;
    let count = snapshot_writer::run_once(&state).await?;
    Ok(Json(json!({ "status": "triggered", "snapshotsWritten": count })))
}
