use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::KimchiSnapshotRow;

/// Fresh input for one kimchi-premium sample, before it is given an id and
/// a timestamp by the store.
pub struct NewSnapshot {
    pub coin: String,
    pub bithumb_krw: BigDecimal,
    pub binance_usd: BigDecimal,
    pub premium_pct: f64,
    pub krw_usd_rate: f64,
    pub volume_24h_usd: BigDecimal,
}

/// Insert one snapshot row, returning it with its assigned id and timestamp.
pub async fn insert(pool: &PgPool, snapshot: NewSnapshot) -> anyhow::Result<KimchiSnapshotRow> {
    let row = sqlx::query_as!(
        KimchiSnapshotRow,
        r#"
        INSERT INTO kimchi_snapshots
            (id, coin, bithumb_krw, binance_usd, premium_pct, krw_usd_rate, volume_24h_usd, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, now())
        RETURNING id, coin, bithumb_krw, binance_usd, premium_pct, krw_usd_rate, volume_24h_usd, created_at
        "#,
        Uuid::new_v4(),
        snapshot.coin,
        snapshot.bithumb_krw,
        snapshot.binance_usd,
        snapshot.premium_pct,
        snapshot.krw_usd_rate,
        snapshot.volume_24h_usd,
    )
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Most recent snapshot for a coin, if one was written within the last 7
/// days. Older rows are treated as stale and are not returned to callers.
pub async fn most_recent(pool: &PgPool, coin: &str) -> anyhow::Result<Option<KimchiSnapshotRow>> {
    let cutoff = Utc::now() - Duration::days(7);

    let row = sqlx::query_as!(
        KimchiSnapshotRow,
        r#"
        SELECT id, coin, bithumb_krw, binance_usd, premium_pct, krw_usd_rate, volume_24h_usd, created_at
        FROM kimchi_snapshots
        WHERE coin = $1 AND created_at >= $2
        ORDER BY created_at DESC
        LIMIT 1
        "#,
        coin,
        cutoff,
    )
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// History for a coin between two points in time, oldest first, used for
/// trend and volatility estimation over the historical window.
pub async fn history(
    pool: &PgPool,
    coin: &str,
    since: DateTime<Utc>,
) -> anyhow::Result<Vec<KimchiSnapshotRow>> {
    let rows = sqlx::query_as!(
        KimchiSnapshotRow,
        r#"
        SELECT id, coin, bithumb_krw, binance_usd, premium_pct, krw_usd_rate, volume_24h_usd, created_at
        FROM kimchi_snapshots
        WHERE coin = $1 AND created_at >= $2
        ORDER BY created_at ASC
        "#,
        coin,
        since,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
