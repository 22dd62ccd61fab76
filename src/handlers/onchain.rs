// GET /api/onchain/usdc-transfers?limit=1..20
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::constants::{ONCHAIN_TRANSFERS_MAX_LIMIT, ONCHAIN_TRANSFERS_MIN_LIMIT};
use crate::models::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UsdcTransfersQuery {
    limit: Option<usize>,
}

pub async fn get_usdc_transfers(
    State(state): State<AppState>,
    Query(params): Query<UsdcTransfersQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(10)
        .clamp(ONCHAIN_TRANSFERS_MIN_LIMIT, ONCHAIN_TRANSFERS_MAX_LIMIT);

    let transfers = state.usdc_cache.get(&state.http_client, limit).await?;

    Ok(Json(json!({
        "transfers": transfers,
        "at": Utc::now().to_rfc3339(),
    })))
}
