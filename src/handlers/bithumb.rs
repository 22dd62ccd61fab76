// GET /api/premium/bithumb/orderbook and /volume-analysis.
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::aggregation::orderbook::{fetch_orderbook, to_view};
use crate::aggregation::volume::bithumb_volume_analysis;
use crate::models::error::ApiError;
use crate::state::AppState;

const SERVICE_NAME: &str = "crossfin-bithumb-market";

#[derive(Debug, Deserialize)]
pub struct OrderbookQuery {
    pair: String,
}

pub async fn get_orderbook(
    State(state): State<AppState>,
    Query(params): Query<OrderbookQuery>,
) -> Result<Json<Value>, ApiError> {
    let pair = params.pair.trim().to_ascii_uppercase();
    if pair.is_empty() {
        return Err(ApiError::BadInput("pair is required".into()));
    }

    let (bids, asks) = fetch_orderbook(&state.http_client, &pair).await?;
    let view = to_view(&pair, &bids, &asks);

    Ok(Json(json!({
        "paid": true,
        "service": SERVICE_NAME,
        "orderbook": view,
        "at": Utc::now().to_rfc3339(),
    })))
}

pub async fn get_volume_analysis(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let fx_rate = state.fx_cache.get(&state.http_client).await;
    let bithumb = state.bithumb_cache.get(&state.http_client).await?;
    let analysis = bithumb_volume_analysis(&bithumb, fx_rate);

    Ok(Json(json!({
        "paid": true,
        "service": SERVICE_NAME,
        "volumeAnalysis": analysis,
        "at": Utc::now().to_rfc3339(),
    })))
}
