use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One hourly kimchi-premium sample, written by the scheduled snapshot writer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct KimchiSnapshotRow {
    pub id: Uuid,
    pub coin: String,
    pub bithumb_krw: BigDecimal,
    pub binance_usd: BigDecimal,
    pub premium_pct: f64,
    pub krw_usd_rate: f64,
    pub volume_24h_usd: BigDecimal,
    pub created_at: DateTime<Utc>,
}

/// A discoverable market-data service in the registry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub endpoint: String,
    pub category: String,
    pub is_paid: bool,
    pub status: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A logged proxy call, kept only long enough to back rate-limit aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceCall {
    pub id: Uuid,
    pub service_id: Uuid,
    pub agent_id: String,
    pub status: String,
    pub response_time_ms: i32,
    pub created_at: DateTime<Utc>,
}
