// Hourly bucketing of persisted kimchi snapshots for the history endpoint.
use bigdecimal::BigDecimal;
use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;

use crate::aggregation::numeric::round2;
use crossfin_store::KimchiSnapshotRow;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub hour: DateTime<Utc>,
    pub bithumb_krw: f64,
    pub binance_usd: f64,
    pub premium_pct: f64,
    pub krw_usd_rate: f64,
    pub volume_24h_usd: f64,
}

/// Bucket ascending-ordered snapshot rows into one point per hour, keeping
/// the last sample observed within each hour.
pub fn bucket_hourly(rows: &[KimchiSnapshotRow]) -> Vec<HistoryPoint> {
    let mut buckets: Vec<HistoryPoint> = Vec::new();

    for row in rows {
        let hour = row
            .created_at
            .with_minute(0)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(row.created_at);

        let point = HistoryPoint {
            hour,
            bithumb_krw: round2(bigdecimal_to_f64(&row.bithumb_krw)),
            binance_usd: round2(bigdecimal_to_f64(&row.binance_usd)),
            premium_pct: round2(row.premium_pct),
            krw_usd_rate: round2(row.krw_usd_rate),
            volume_24h_usd: round2(bigdecimal_to_f64(&row.volume_24h_usd)),
        };

        match buckets.last_mut() {
            Some(last) if last.hour == hour => *last = point,
            _ => buckets.push(point),
        }
    }

    buckets
}

fn bigdecimal_to_f64(value: &BigDecimal) -> f64 {
    value.to_string().parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn row(coin: &str, premium: f64, created_at: DateTime<Utc>) -> KimchiSnapshotRow {
        KimchiSnapshotRow {
            id: Uuid::new_v4(),
            coin: coin.to_string(),
            bithumb_krw: BigDecimal::from(98_500_000),
            binance_usd: BigDecimal::from(66_500),
            premium_pct: premium,
            krw_usd_rate: 1450.0,
            volume_24h_usd: BigDecimal::from(1_000_000),
            created_at,
        }
    }

    #[test]
    fn collapses_same_hour_samples_to_the_last_one() {
        let base = Utc::now().with_minute(15).unwrap().with_second(0).unwrap().with_nanosecond(0).unwrap();
        let rows = vec![row("BTC", 1.0, base), row("BTC", 1.5, base + chrono::Duration::minutes(30))];
        let points = bucket_hourly(&rows);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].premium_pct, 1.5);
    }

    #[test]
    fn separate_hours_produce_separate_points() {
        let base = Utc::now().with_minute(0).unwrap().with_second(0).unwrap().with_nanosecond(0).unwrap();
        let rows = vec![row("BTC", 1.0, base), row("BTC", 1.2, base + chrono::Duration::hours(1))];
        let points = bucket_hourly(&rows);
        assert_eq!(points.len(), 2);
    }
}
