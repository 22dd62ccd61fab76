// GET /api/premium/market/cross-exchange?coins=BTC,ETH,...
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::aggregation::cross_exchange::{build_cross_exchange_rows, ArbitrageSignal};
use crate::models::error::ApiError;
use crate::state::AppState;

const SERVICE_NAME: &str = "crossfin-cross-exchange";

#[derive(Debug, Deserialize)]
pub struct CrossExchangeQuery {
    coins: String,
}

pub async fn get_cross_exchange(
    State(state): State<AppState>,
    Query(params): Query<CrossExchangeQuery>,
) -> Result<Json<Value>, ApiError> {
    let coins: Vec<String> = params
        .coins
        .split(',')
        .map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    let fx_rate = state.fx_cache.get(&state.http_client).await;
    let bithumb = state.bithumb_cache.get(&state.http_client).await?;
    let global = state.global_price_cache.get(state.http_client.clone(), state.db.clone()).await?;

    let rows = build_cross_exchange_rows(&state.http_client, &bithumb, &global, fx_rate, &coins).await?;
    let arbitrage_candidate_count = rows.iter().filter(|r| r.action == ArbitrageSignal::Arbitrage).count();

    Ok(Json(json!({
        "paid": true,
        "service": SERVICE_NAME,
        "rows": rows,
        "summary": { "arbitrageCandidateCount": arbitrage_candidate_count },
        "at": Utc::now().to_rfc3339(),
    })))
}
