// Bithumb "all tickers" snapshot cache: map coin -> ticker fields.
use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::single_flight::Cached;
use crate::models::error::ApiError;
use crate::net::{FetchLimits, OutboundClient};

const SUCCESS_TTL: Duration = Duration::from_secs(10);
const FAILURE_TTL: Duration = Duration::from_secs(2);

const ALL_TICKERS_URL: &str = "https://api.bithumb.com/public/ticker/ALL_KRW";

#[derive(Debug, Clone, Copy)]
pub struct BithumbTicker {
    pub closing_price: f64,
    pub volume_24h_krw: f64,
    pub change_24h_pct: f64,
}

pub type BithumbMap = HashMap<String, BithumbTicker>;

pub struct BithumbTickerCache {
    cached: Cached<BithumbMap>,
}

impl BithumbTickerCache {
    pub fn new() -> Self {
        Self { cached: Cached::new(SUCCESS_TTL, FAILURE_TTL) }
    }

    /// Returns the latest map, or the last known map if the fetch failed.
    /// Only propagates an error if there is no prior value at all.
    pub async fn get(&self, client: &OutboundClient) -> Result<BithumbMap, ApiError> {
        self.cached.get_or_fetch(|| fetch_all(client)).await
    }
}

impl Default for BithumbTickerCache {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    data: HashMap<String, serde_json::Value>,
}

async fn fetch_all(client: &OutboundClient) -> Result<BithumbMap, ApiError> {
    let raw: RawResponse = client.fetch_json(ALL_TICKERS_URL, FetchLimits::default()).await?;

    let mut map = BithumbMap::new();
    for (coin, value) in raw.data {
        if coin == "date" {
            continue;
        }
        let Some(obj) = value.as_object() else { continue };

        let closing_price = obj.get("closing_price").and_then(parse_numeric);
        let volume = obj.get("units_traded_24H").and_then(parse_numeric);
        let change = obj.get("fluctate_rate_24H").and_then(parse_numeric);

        if let (Some(closing_price), Some(volume)) = (closing_price, volume) {
            map.insert(
                coin,
                BithumbTicker {
                    closing_price,
                    volume_24h_krw: volume * closing_price,
                    change_24h_pct: change.unwrap_or(0.0),
                },
            );
        }
    }

    Ok(map)
}

fn parse_numeric(value: &serde_json::Value) -> Option<f64> {
    value.as_str().and_then(|s| s.parse::<f64>().ok()).or_else(|| value.as_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_encoded_numbers() {
        let value = serde_json::json!("12345.67");
        assert_eq!(parse_numeric(&value), Some(12345.67));
    }

    #[test]
    fn skips_the_date_pseudo_field() {
        let raw = RawResponse {
            data: HashMap::from([
                ("date".to_string(), serde_json::json!("1234567890")),
            ]),
        };
        // `date` has no closing_price/units_traded_24H so it would be
        // skipped by fetch_all's field lookup regardless.
        assert!(raw.data.contains_key("date"));
    }
}
