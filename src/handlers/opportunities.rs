// GET /api/premium/arbitrage/opportunities — Decision Layer output per
// tracked coin plus a market-wide summary label.
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::aggregation::kimchi::kimchi_rows;
use crate::aggregation::numeric::round2;
use crate::aggregation::orderbook;
use crate::decision::{compute_action, market_condition, premium_trend, slippage_from_asks};
use crate::models::error::ApiError;
use crate::routing::topology;
use crate::state::AppState;

const SERVICE_NAME: &str = "crossfin-arbitrage-opportunities";
const OPPORTUNITY_NOTIONAL_KRW: f64 = 15_000_000.0;
const TREND_WINDOW_HOURS: i64 = 6;

pub async fn get_opportunities(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let fx_rate = state.fx_cache.get(&state.http_client).await;
    let bithumb = state.bithumb_cache.get(&state.http_client).await?;
    let global = state.global_price_cache.get(state.http_client.clone(), state.db.clone()).await?;

    let rows = kimchi_rows(&bithumb, &global, fx_rate);
    let fee_offset = trading_fee_offset();

    let orderbook_futs = rows.iter().map(|r| orderbook::fetch_orderbook(&state.http_client, &r.coin));
    let orderbooks = futures::future::join_all(orderbook_futs).await;

    let trend_futs = rows.iter().map(|r| premium_trend(&state.db, &r.coin, TREND_WINDOW_HOURS));
    let trends = futures::future::join_all(trend_futs).await;

    let mut opportunities = Vec::with_capacity(rows.len());
    let mut actions = Vec::with_capacity(rows.len());

    for ((row, ob), trend) in rows.iter().zip(orderbooks).zip(trends) {
        let asks = ob.map(|(_, asks)| asks).unwrap_or_default();
        let slippage_pct = slippage_from_asks(&asks, OPPORTUNITY_NOTIONAL_KRW);
        let transfer_time_min = topology::transfer_time_minutes(&row.coin);
        let net_profit_pct = row.premium_pct - fee_offset;
        let decision = compute_action(net_profit_pct, slippage_pct, transfer_time_min, trend.volatility_pct);

        actions.push(decision.action);
        opportunities.push(json!({
            "coin": row.coin,
            "premiumPct": row.premium_pct,
            "netProfitPct": round2(net_profit_pct),
            "slippagePct": round2(slippage_pct),
            "transferTimeMin": transfer_time_min,
            "volatilityPct": round2(trend.volatility_pct),
            "action": decision.action,
            "confidence": decision.confidence,
            "reason": decision.reason,
        }));
    }

    Ok(Json(json!({
        "paid": true,
        "service": SERVICE_NAME,
        "opportunities": opportunities,
        "marketCondition": market_condition(&actions),
        "at": Utc::now().to_rfc3339(),
    })))
}

fn trading_fee_offset() -> f64 {
    topology::find_exchange("bithumb").map(|e| e.trading_fee_pct).unwrap_or(0.0)
        + topology::find_exchange("binance").map(|e| e.trading_fee_pct).unwrap_or(0.0)
}
