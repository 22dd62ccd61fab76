// GET /api/arbitrage/demo — unpaid showcase over a fixed 3-coin set, with a
// live -> snapshot -> zeroed-fallback cascade so the endpoint never errors.
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::aggregation::kimchi::kimchi_rows;
use crate::aggregation::orderbook;
use crate::decision::{compute_action, market_condition, premium_trend, slippage_from_asks};
use crate::models::error::ApiError;
use crate::models::kimchi::{KimchiRow, KimchiSnapshot};
use crate::routing::topology;
use crate::state::AppState;

const DEMO_COINS: [&str; 3] = ["BTC", "ETH", "XRP"];
const OPPORTUNITY_NOTIONAL_KRW: f64 = 15_000_000.0;
const TREND_WINDOW_HOURS: i64 = 6;

pub async fn get_demo(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let (rows, data_source) = match try_live(&state).await {
        Some(rows) => (rows, "live"),
        None => match try_snapshot(&state).await {
            Some(rows) => (rows, "snapshot"),
            None => (fallback_rows(), "fallback"),
        },
    };

    let fee_offset = topology::find_exchange("bithumb").map(|e| e.trading_fee_pct).unwrap_or(0.0)
        + topology::find_exchange("binance").map(|e| e.trading_fee_pct).unwrap_or(0.0);

    let mut preview = Vec::with_capacity(rows.len());
    let mut actions = Vec::with_capacity(rows.len());

    for row in &rows {
        let (_, asks) = orderbook::fetch_orderbook(&state.http_client, &row.coin).await.unwrap_or_default();
        let slippage_pct = slippage_from_asks(&asks, OPPORTUNITY_NOTIONAL_KRW);
        let transfer_time_min = topology::transfer_time_minutes(&row.coin);
        let trend = premium_trend(&state.db, &row.coin, TREND_WINDOW_HOURS).await;
        let net_profit_pct = row.premium_pct - fee_offset;
        let decision = compute_action(net_profit_pct, slippage_pct, transfer_time_min, trend.volatility_pct);

        actions.push(decision.action);
        preview.push(json!({
            "coin": row.coin,
            "premiumPct": row.premium_pct,
            "action": decision.action,
            "confidence": decision.confidence,
        }));
    }

    Ok(Json(json!({
        "dataSource": data_source,
        "preview": preview,
        "marketCondition": market_condition(&actions),
        "at": Utc::now().to_rfc3339(),
    })))
}

async fn try_live(state: &AppState) -> Option<Vec<KimchiRow>> {
    let bithumb = state.bithumb_cache.get(&state.http_client).await.ok()?;
    let global = state
        .global_price_cache
        .get(state.http_client.clone(), state.db.clone())
        .await
        .ok()?;
    let fx_rate = state.fx_cache.get(&state.http_client).await;

    let rows: Vec<KimchiRow> = kimchi_rows(&bithumb, &global, fx_rate)
        .into_iter()
        .filter(|r| DEMO_COINS.contains(&r.coin.as_str()))
        .collect();

    if rows.is_empty() {
        None
    } else {
        Some(rows)
    }
}

async fn try_snapshot(state: &AppState) -> Option<Vec<KimchiRow>> {
    let mut rows = Vec::new();
    for coin in DEMO_COINS {
        if let Ok(Some(row)) = crossfin_store::snapshots::most_recent(&state.db, coin).await {
            let snapshot: KimchiSnapshot = row.into();
            rows.push(KimchiRow {
                coin: snapshot.coin,
                bithumb_krw: snapshot.bithumb_krw,
                bithumb_usd: snapshot.bithumb_krw / snapshot.krw_usd_rate,
                binance_usd: snapshot.binance_usd,
                premium_pct: snapshot.premium_pct,
                volume_24h_krw: snapshot.volume_24h_usd * snapshot.krw_usd_rate,
                volume_24h_usd: snapshot.volume_24h_usd,
                change_24h_pct: 0.0,
            });
        }
    }

    if rows.is_empty() {
        None
    } else {
        Some(rows)
    }
}

fn fallback_rows() -> Vec<KimchiRow> {
    DEMO_COINS
        .iter()
        .map(|coin| KimchiRow {
            coin: coin.to_string(),
            bithumb_krw: 0.0,
            bithumb_usd: 0.0,
            binance_usd: 0.0,
            premium_pct: 0.0,
            volume_24h_krw: 0.0,
            volume_24h_usd: 0.0,
            change_24h_pct: 0.0,
        })
        .collect()
}
