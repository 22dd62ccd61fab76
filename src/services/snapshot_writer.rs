// Scheduled kimchi-snapshot writer (spec §4.2): one tick inserts a fresh
// snapshot row per tracked coin, optionally logging a decision score when
// the guardian feature flag is enabled.
use std::time::Duration;

use bigdecimal::BigDecimal;

use crate::aggregation::kimchi::kimchi_rows;
use crate::decision::{compute_action, premium_trend};
use crate::models::kimchi::KimchiRow;
use crate::routing::topology;
use crate::state::AppState;

const TICK_INTERVAL: Duration = Duration::from_secs(60 * 60);
const TREND_WINDOW_HOURS: i64 = 6;

/// Spawn the scheduled writer as a background task, firing once per hour.
pub fn spawn(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        loop {
            interval.tick().await;
            match run_once(&state).await {
                Ok(count) => tracing::info!(snapshots_written = count, "kimchi snapshot tick complete"),
                Err(e) => tracing::warn!(error = %e, "kimchi snapshot tick failed"),
            }
        }
    });
}

/// Run one tick synchronously; shared by the background loop and the
/// admin-triggered endpoint.
pub async fn run_once(state: &AppState) -> anyhow::Result<usize> {
    let fx_rate = state.fx_cache.get(&state.http_client).await;
    let bithumb = state.bithumb_cache.get(&state.http_client).await?;
    let global = state
        .global_price_cache
        .get(state.http_client.clone(), state.db.clone())
        .await?;

    let rows = kimchi_rows(&bithumb, &global, fx_rate);

    for row in &rows {
        crossfin_store::snapshots::insert(
            &state.db,
            crossfin_store::snapshots::NewSnapshot {
                coin: row.coin.clone(),
                bithumb_krw: BigDecimal::try_from(row.bithumb_krw).unwrap_or_default(),
                binance_usd: BigDecimal::try_from(row.binance_usd).unwrap_or_default(),
                premium_pct: row.premium_pct,
                krw_usd_rate: fx_rate,
                volume_24h_usd: BigDecimal::try_from(row.volume_24h_usd).unwrap_or_default(),
            },
        )
        .await?;

        if state.config.guardian_enabled {
            score_for_observability(state, row).await;
        }
    }

    Ok(rows.len())
}

async fn score_for_observability(state: &AppState, row: &KimchiRow) {
    let fee_offset = topology::find_exchange("bithumb").map(|e| e.trading_fee_pct).unwrap_or(0.0)
        + topology::find_exchange("binance").map(|e| e.trading_fee_pct).unwrap_or(0.0);
    let trend = premium_trend(&state.db, &row.coin, TREND_WINDOW_HOURS).await;
    // No live orderbook fetch on the background tick; slippage is scored
    // against zero depth so the guardian log reflects the worst case.
    let transfer_time_min = topology::transfer_time_minutes(&row.coin);
    let decision = compute_action(row.premium_pct - fee_offset, 0.0, transfer_time_min, trend.volatility_pct);
    tracing::debug!(coin = %row.coin, action = ?decision.action, confidence = decision.confidence, "guardian decision score");
}
