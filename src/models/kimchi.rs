// Transient per-request data model for kimchi-premium and cross-exchange
// aggregation. None of these types are persisted; `KimchiSnapshot` mirrors
// the row owned by `crossfin_store` for use in pure aggregation/decision code.
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One row of a live exchange ticker, derived per request from the caches.
#[derive(Debug, Clone)]
pub struct TickerRow {
    pub exchange: String,
    pub coin: String,
    pub krw_price: Option<f64>,
    pub usd_price: Option<f64>,
    pub volume_24h_krw: Option<f64>,
    pub volume_24h_usd: Option<f64>,
    pub change_24h_pct: Option<f64>,
}

/// One orderbook level; both fields are always non-negative.
#[derive(Debug, Clone, Copy)]
pub struct OrderbookLevel {
    pub price: f64,
    pub quantity: f64,
}

/// The kimchi-premium output row for one tracked coin.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KimchiRow {
    pub coin: String,
    pub bithumb_krw: f64,
    pub bithumb_usd: f64,
    pub binance_usd: f64,
    pub premium_pct: f64,
    pub volume_24h_krw: f64,
    pub volume_24h_usd: f64,
    pub change_24h_pct: f64,
}

/// In-process mirror of `crossfin_store::KimchiSnapshotRow`, used by pure
/// aggregation/decision functions so they don't depend on the store crate.
#[derive(Debug, Clone)]
pub struct KimchiSnapshot {
    pub coin: String,
    pub bithumb_krw: f64,
    pub binance_usd: f64,
    pub premium_pct: f64,
    pub krw_usd_rate: f64,
    pub volume_24h_usd: f64,
    pub created_at: DateTime<Utc>,
}

impl From<crossfin_store::KimchiSnapshotRow> for KimchiSnapshot {
    fn from(row: crossfin_store::KimchiSnapshotRow) -> Self {
        Self {
            coin: row.coin,
            bithumb_krw: bigdecimal_to_f64(&row.bithumb_krw),
            binance_usd: bigdecimal_to_f64(&row.binance_usd),
            premium_pct: row.premium_pct,
            krw_usd_rate: row.krw_usd_rate,
            volume_24h_usd: bigdecimal_to_f64(&row.volume_24h_usd),
            created_at: row.created_at,
        }
    }
}

fn bigdecimal_to_f64(value: &BigDecimal) -> f64 {
    value.to_string().parse().unwrap_or(0.0)
}
