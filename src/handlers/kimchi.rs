// GET /api/premium/arbitrage/kimchi and its /history variant.
use axum::extract::{Query, State};
use axum::Json;
use chrono::{Duration as ChronoDuration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::aggregation::bundles::kimchi_stats;
use crate::aggregation::history::bucket_hourly;
use crate::aggregation::kimchi::kimchi_rows;
use crate::aggregation::numeric::round2;
use crate::constants::{KIMCHI_HISTORY_MAX_HOURS, KIMCHI_HISTORY_MIN_HOURS};
use crate::models::error::ApiError;
use crate::state::AppState;

const SERVICE_NAME: &str = "crossfin-kimchi-premium";

pub async fn get_kimchi_premium(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let fx_rate = state.fx_cache.get(&state.http_client).await;
    let bithumb = state.bithumb_cache.get(&state.http_client).await?;
    let global = state.global_price_cache.get(state.http_client.clone(), state.db.clone()).await?;

    let rows = kimchi_rows(&bithumb, &global, fx_rate);
    let stats = kimchi_stats(&rows);

    Ok(Json(json!({
        "paid": true,
        "service": SERVICE_NAME,
        "krwUsdRate": round2(fx_rate),
        "pairsTracked": stats.pairs_tracked,
        "avgPremiumPct": stats.avg_premium_pct,
        "topPremium": stats.top_premium,
        "premiums": rows,
        "at": Utc::now().to_rfc3339(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    coin: String,
    hours: Option<i64>,
}

pub async fn get_kimchi_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Value>, ApiError> {
    let coin = params.coin.trim().to_ascii_uppercase();
    if coin.is_empty() {
        return Err(ApiError::BadInput("coin is required".into()));
    }
    let hours = params
        .hours
        .unwrap_or(24)
        .clamp(KIMCHI_HISTORY_MIN_HOURS, KIMCHI_HISTORY_MAX_HOURS);
    let since = Utc::now() - ChronoDuration::hours(hours);

    let rows = crossfin_store::snapshots::history(&state.db, &coin, since).await?;
    let points = bucket_hourly(&rows);

    Ok(Json(json!({
        "paid": true,
        "service": SERVICE_NAME,
        "coin": coin,
        "hours": hours,
        "points": points,
        "at": Utc::now().to_rfc3339(),
    })))
}
