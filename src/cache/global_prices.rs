// Global USD price cache for tracked symbols. Tries a sequence of providers,
// validates the result, and gap-fills missing symbols in the background.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use sqlx::PgPool;

use crate::cache::single_flight::Cached;
use crate::models::error::ApiError;
use crate::net::{FetchLimits, OutboundClient};
use crate::routing::topology;

const SUCCESS_TTL: Duration = Duration::from_secs(30);
const FAILURE_TTL: Duration = Duration::from_secs(5);

const BINANCE_BASE_URLS: &[&str] = &[
    "https://api.binance.com",
    "https://api1.binance.com",
    "https://api2.binance.com",
];
const SECONDARY_PROVIDER_URL: &str = "https://min-api.cryptocompare.com/data/pricemulti";
const TERTIARY_PROVIDER_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

pub type GlobalPriceMap = HashMap<String, f64>;

pub struct GlobalPriceCache {
    cached: Arc<Cached<GlobalPriceMap>>,
}

impl GlobalPriceCache {
    pub fn new() -> Self {
        Self { cached: Arc::new(Cached::new(SUCCESS_TTL, FAILURE_TTL)) }
    }

    /// Returns the latest tracked-symbol -> USD price map, acquiring it via
    /// the provider sequence if stale. Spawns a background gap-fill task for
    /// any symbol still missing after the initial batch.
    pub async fn get(
        &self,
        client: Arc<OutboundClient>,
        store: PgPool,
    ) -> Result<GlobalPriceMap, ApiError> {
        let cached = self.cached.clone();
        let client_for_fetch = client.clone();
        let store_for_fetch = store.clone();

        let result = cached
            .get_or_fetch(move || acquire(client_for_fetch, store_for_fetch))
            .await?;

        let missing: Vec<String> = topology::TRACKED_SYMBOLS
            .iter()
            .filter(|s| !result.contains_key(s.coin))
            .map(|s| s.coin.to_string())
            .collect();

        if !missing.is_empty() {
            let cached = self.cached.clone();
            tokio::spawn(async move {
                gap_fill(cached, client, missing).await;
            });
        }

        Ok(result)
    }
}

impl Default for GlobalPriceCache {
    fn default() -> Self {
        Self::new()
    }
}

fn is_valid(map: &GlobalPriceMap) -> bool {
    let btc_ok = map.get("BTC").is_some_and(|p| p.is_finite() && *p > 1000.0);
    let has_other = map.keys().any(|k| k != "BTC");
    btc_ok && has_other
}

async fn acquire(client: Arc<OutboundClient>, store: PgPool) -> Result<GlobalPriceMap, ApiError> {
    if let Some(map) = fetch_binance_batch(&client).await {
        if is_valid(&map) {
            return Ok(map);
        }
    }

    if let Some(map) = fetch_secondary(&client).await {
        if is_valid(&map) {
            return Ok(map);
        }
    }

    if let Some(map) = fetch_tertiary(&client).await {
        if is_valid(&map) {
            return Ok(map);
        }
    }

    if let Some(map) = fetch_from_snapshots(&store).await {
        if is_valid(&map) {
            return Ok(map);
        }
    }

    Err(ApiError::UpstreamUnavailable("all global price providers exhausted".into()))
}

async fn fetch_binance_batch(client: &OutboundClient) -> Option<GlobalPriceMap> {
    #[derive(Deserialize)]
    struct Ticker {
        symbol: String,
        price: String,
    }

    for base in BINANCE_BASE_URLS {
        let url = format!("{base}/api/v3/ticker/price");
        if let Ok(tickers) = client.fetch_json::<Vec<Ticker>>(&url, FetchLimits::default()).await {
            let mut map = GlobalPriceMap::new();
            for symbol in topology::TRACKED_SYMBOLS {
                if let Some(t) = tickers.iter().find(|t| t.symbol == symbol.global_symbol) {
                    if let Ok(price) = t.price.parse::<f64>() {
                        map.insert(symbol.coin.to_string(), price);
                    }
                }
            }
            if !map.is_empty() {
                return Some(map);
            }
        }
    }
    None
}

async fn fetch_secondary(client: &OutboundClient) -> Option<GlobalPriceMap> {
    let symbols: Vec<&str> = topology::TRACKED_SYMBOLS.iter().map(|s| s.coin).collect();
    let url = format!("{SECONDARY_PROVIDER_URL}?fsyms={}&tsyms=USD", symbols.join(","));

    let raw: HashMap<String, HashMap<String, f64>> =
        client.fetch_json(&url, FetchLimits::default()).await.ok()?;

    let mut map = GlobalPriceMap::new();
    for (coin, by_quote) in raw {
        if let Some(price) = by_quote.get("USD") {
            map.insert(coin, *price);
        }
    }
    Some(map)
}

async fn fetch_tertiary(client: &OutboundClient) -> Option<GlobalPriceMap> {
    let ids: Vec<&str> = topology::TRACKED_SYMBOLS.iter().map(|s| s.coingecko_id).collect();
    let url = format!("{TERTIARY_PROVIDER_URL}?ids={}&vs_currencies=usd", ids.join(","));

    let raw: HashMap<String, HashMap<String, f64>> =
        client.fetch_json(&url, FetchLimits::default()).await.ok()?;

    let mut map = GlobalPriceMap::new();
    for symbol in topology::TRACKED_SYMBOLS {
        if let Some(price) = raw.get(symbol.coingecko_id).and_then(|m| m.get("usd")) {
            map.insert(symbol.coin.to_string(), *price);
        }
    }
    Some(map)
}

async fn fetch_from_snapshots(store: &PgPool) -> Option<GlobalPriceMap> {
    let mut map = GlobalPriceMap::new();
    for symbol in topology::TRACKED_SYMBOLS {
        if let Ok(Some(row)) = crossfin_store::snapshots::most_recent(store, symbol.coin).await {
            let price: f64 = row.binance_usd.to_string().parse().unwrap_or(0.0);
            if price > 0.0 {
                map.insert(symbol.coin.to_string(), price);
            }
        }
    }
    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

/// Issue parallel per-symbol requests for coins missing from the initial
/// batch and merge them into the cache in place. Never blocks the caller
/// that triggered the initial fetch.
async fn gap_fill(cached: Arc<Cached<GlobalPriceMap>>, client: Arc<OutboundClient>, missing: Vec<String>) {
    let fetches = missing.into_iter().map(|coin| {
        let client = client.clone();
        async move {
            let symbol = topology::TRACKED_SYMBOLS.iter().find(|s| s.coin == coin)?;
            let url = format!(
                "{}/api/v3/ticker/price?symbol={}",
                BINANCE_BASE_URLS[0], symbol.global_symbol
            );
            #[derive(Deserialize)]
            struct Ticker {
                price: String,
            }
            let ticker: Ticker = client.fetch_json(&url, FetchLimits::default()).await.ok()?;
            let price: f64 = ticker.price.parse().ok()?;
            Some((coin, price))
        }
    });

    let results = futures::future::join_all(fetches).await;

    if let Some(mut current) = cached.peek().await {
        for result in results.into_iter().flatten() {
            current.insert(result.0, result.1);
        }
        cached.seed(current).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_requires_btc_and_one_other() {
        let mut map = GlobalPriceMap::new();
        assert!(!is_valid(&map));

        map.insert("BTC".to_string(), 66500.0);
        assert!(!is_valid(&map));

        map.insert("ETH".to_string(), 3200.0);
        assert!(is_valid(&map));
    }

    #[test]
    fn validation_rejects_non_finite_or_low_btc_price() {
        let mut map = GlobalPriceMap::new();
        map.insert("BTC".to_string(), 500.0);
        map.insert("ETH".to_string(), 3200.0);
        assert!(!is_valid(&map));

        map.insert("BTC".to_string(), f64::NAN);
        assert!(!is_valid(&map));
    }
}
