// Premium trend/volatility from historical snapshot rows.
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumTrend {
    pub direction: TrendDirection,
    pub volatility_pct: f64,
}

const STABLE: PremiumTrend = PremiumTrend { direction: TrendDirection::Stable, volatility_pct: 0.0 };

/// Read snapshot rows for `coin` within the last `window_hours` and compute
/// a direction and a volatility estimate. Any error or insufficient history
/// degrades to `{stable, 0}` rather than failing the caller.
pub async fn premium_trend(store: &PgPool, coin: &str, window_hours: i64) -> PremiumTrend {
    let since: DateTime<Utc> = Utc::now() - Duration::hours(window_hours);

    let rows = match crossfin_store::snapshots::history(store, coin, since).await {
        Ok(rows) if rows.len() >= 2 => rows,
        _ => return STABLE,
    };

    let premiums: Vec<f64> = rows.iter().map(|r| r.premium_pct).collect();
    direction_and_volatility(&premiums)
}

fn direction_and_volatility(premiums: &[f64]) -> PremiumTrend {
    let first = premiums[0];
    let last = *premiums.last().unwrap();
    let delta = last - first;

    let direction = if delta > 0.3 {
        TrendDirection::Rising
    } else if delta < -0.3 {
        TrendDirection::Falling
    } else {
        TrendDirection::Stable
    };

    let mean = premiums.iter().sum::<f64>() / premiums.len() as f64;
    let variance = premiums.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / premiums.len() as f64;

    PremiumTrend { direction, volatility_pct: variance.sqrt() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_series_is_stable_with_zero_volatility() {
        let trend = direction_and_volatility(&[1.2, 1.2, 1.2, 1.2]);
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.volatility_pct, 0.0);
    }

    #[test]
    fn rising_series_crosses_threshold() {
        let trend = direction_and_volatility(&[0.5, 0.6, 1.0]);
        assert_eq!(trend.direction, TrendDirection::Rising);
    }

    #[test]
    fn falling_series_crosses_threshold() {
        let trend = direction_and_volatility(&[1.0, 0.8, 0.5]);
        assert_eq!(trend.direction, TrendDirection::Falling);
    }

    #[test]
    fn small_delta_stays_stable() {
        let trend = direction_and_volatility(&[1.0, 1.1, 1.2]);
        assert_eq!(trend.direction, TrendDirection::Stable);
    }
}
