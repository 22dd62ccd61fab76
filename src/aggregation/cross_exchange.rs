// CrossExchange(coinList, fxRate) — per-coin comparison across the three
// live-quoted Korean venues plus the global USD venue.
use serde::{Deserialize, Serialize};

use crate::aggregation::numeric::round2;
use crate::cache::bithumb::BithumbMap;
use crate::cache::global_prices::GlobalPriceMap;
use crate::models::error::ApiError;
use crate::net::{FetchLimits, OutboundClient};

const UPBIT_TICKER_URL: &str = "https://api.upbit.com/v1/ticker";
const COINONE_TICKER_URL: &str = "https://api.coinone.co.kr/public/v2/ticker_new/KRW";

#[derive(Debug, Clone, Copy)]
pub struct VenueQuote {
    pub krw_price: f64,
    pub volume_24h_krw: f64,
    pub change_24h_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ArbitrageSignal {
    Arbitrage,
    Monitor,
    Hold,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossExchangeRow {
    pub coin: String,
    pub bithumb: Option<VenuePriceView>,
    pub upbit: Option<VenuePriceView>,
    pub coinone: Option<VenuePriceView>,
    pub global_usd: Option<f64>,
    pub avg_premium_pct: Option<f64>,
    pub best_buy_exchange: Option<String>,
    pub best_sell_exchange: Option<String>,
    pub spread_pct: Option<f64>,
    pub action: ArbitrageSignal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenuePriceView {
    pub krw_price: f64,
    pub volume_24h_krw: f64,
    pub change_24h_pct: f64,
    pub premium_pct: Option<f64>,
}

/// Fetch live Upbit ticker data for `coin`. Returns `None` on any failure —
/// callers must tolerate a missing venue rather than fail the comparison.
pub async fn fetch_upbit_quote(client: &OutboundClient, coin: &str) -> Option<VenueQuote> {
    #[derive(Deserialize)]
    struct Ticker {
        trade_price: f64,
        acc_trade_price_24h: f64,
        signed_change_rate: f64,
    }

    let url = format!("{UPBIT_TICKER_URL}?markets=KRW-{coin}");
    let tickers: Vec<Ticker> = client.fetch_json(&url, FetchLimits::default()).await.ok()?;
    let ticker = tickers.into_iter().next()?;

    Some(VenueQuote {
        krw_price: ticker.trade_price,
        volume_24h_krw: ticker.acc_trade_price_24h,
        change_24h_pct: ticker.signed_change_rate * 100.0,
    })
}

/// Fetch live Coinone ticker data for `coin`. Same tolerant-failure contract
/// as [`fetch_upbit_quote`].
pub async fn fetch_coinone_quote(client: &OutboundClient, coin: &str) -> Option<VenueQuote> {
    #[derive(Deserialize)]
    struct Response {
        tickers: Vec<Ticker>,
    }
    #[derive(Deserialize)]
    struct Ticker {
        last: String,
        quote_volume: String,
        #[serde(rename = "24h_change_rate")]
        change_rate_24h: Option<String>,
    }

    let url = format!("{COINONE_TICKER_URL}/{}", coin.to_ascii_uppercase());
    let response: Response = client.fetch_json(&url, FetchLimits::default()).await.ok()?;
    let ticker = response.tickers.into_iter().next()?;

    Some(VenueQuote {
        krw_price: ticker.last.parse().ok()?,
        volume_24h_krw: ticker.quote_volume.parse().unwrap_or(0.0),
        change_24h_pct: ticker
            .change_rate_24h
            .and_then(|v| v.parse::<f64>().ok())
            .map(|v| v * 100.0)
            .unwrap_or(0.0),
    })
}

fn premium_vs_global(krw_price: f64, global_usd: f64, fx_rate: f64) -> Option<f64> {
    if global_usd <= 0.0 || fx_rate <= 0.0 {
        return None;
    }
    let usd_price = krw_price / fx_rate;
    Some((usd_price - global_usd) / global_usd * 100.0)
}

/// Pure compute step: combine already-fetched venue quotes into one row.
/// Tags `ARBITRAGE` for domestic spread > 0.5%, `MONITOR` for > 0.2%,
/// `HOLD` otherwise.
pub fn compute_row(
    coin: &str,
    bithumb: Option<VenueQuote>,
    upbit: Option<VenueQuote>,
    coinone: Option<VenueQuote>,
    global_usd: Option<f64>,
    fx_rate: f64,
) -> CrossExchangeRow {
    let to_view = |q: VenueQuote| VenuePriceView {
        krw_price: round2(q.krw_price),
        volume_24h_krw: round2(q.volume_24h_krw),
        change_24h_pct: round2(q.change_24h_pct),
        premium_pct: global_usd.and_then(|g| premium_vs_global(q.krw_price, g, fx_rate)).map(round2),
    };

    let venues: Vec<(&str, VenueQuote)> = [("bithumb", bithumb), ("upbit", upbit), ("coinone", coinone)]
        .into_iter()
        .filter_map(|(name, q)| q.map(|q| (name, q)))
        .collect();

    let premiums: Vec<f64> = global_usd
        .map(|g| {
            venues
                .iter()
                .filter_map(|(_, q)| premium_vs_global(q.krw_price, g, fx_rate))
                .collect()
        })
        .unwrap_or_default();

    let avg_premium_pct = if premiums.is_empty() {
        None
    } else {
        Some(round2(premiums.iter().sum::<f64>() / premiums.len() as f64))
    };

    let (best_buy, best_sell, spread_pct) = if venues.len() >= 2 {
        let cheapest = venues.iter().min_by(|a, b| a.1.krw_price.partial_cmp(&b.1.krw_price).unwrap()).unwrap();
        let priciest = venues.iter().max_by(|a, b| a.1.krw_price.partial_cmp(&b.1.krw_price).unwrap()).unwrap();
        let spread = (priciest.1.krw_price - cheapest.1.krw_price) / cheapest.1.krw_price * 100.0;
        (Some(cheapest.0.to_string()), Some(priciest.0.to_string()), Some(round2(spread)))
    } else {
        (None, None, None)
    };

    let action = match spread_pct {
        Some(pct) if pct > 0.5 => ArbitrageSignal::Arbitrage,
        Some(pct) if pct > 0.2 => ArbitrageSignal::Monitor,
        _ => ArbitrageSignal::Hold,
    };

    CrossExchangeRow {
        coin: coin.to_string(),
        bithumb: venues.iter().find(|(n, _)| *n == "bithumb").map(|(_, q)| to_view(*q)),
        upbit: venues.iter().find(|(n, _)| *n == "upbit").map(|(_, q)| to_view(*q)),
        coinone: venues.iter().find(|(n, _)| *n == "coinone").map(|(_, q)| to_view(*q)),
        global_usd,
        avg_premium_pct,
        best_buy_exchange: best_buy,
        best_sell_exchange: best_sell,
        spread_pct,
        action,
    }
}

pub fn bithumb_quote_for(bithumb: &BithumbMap, coin: &str) -> Option<VenueQuote> {
    bithumb.get(coin).map(|t| VenueQuote {
        krw_price: t.closing_price,
        volume_24h_krw: t.volume_24h_krw,
        change_24h_pct: t.change_24h_pct,
    })
}

pub fn global_quote_for(global: &GlobalPriceMap, coin: &str) -> Option<f64> {
    global.get(coin).copied()
}

pub async fn build_cross_exchange_rows(
    client: &OutboundClient,
    bithumb: &BithumbMap,
    global: &GlobalPriceMap,
    fx_rate: f64,
    coins: &[String],
) -> Result<Vec<CrossExchangeRow>, ApiError> {
    if coins.is_empty() {
        return Err(ApiError::BadInput("coins must not be empty".into()));
    }

    let futures = coins.iter().map(|coin| async move {
        let (upbit, coinone) = tokio::join!(fetch_upbit_quote(client, coin), fetch_coinone_quote(client, coin));
        compute_row(
            coin,
            bithumb_quote_for(bithumb, coin),
            upbit,
            coinone,
            global_quote_for(global, coin),
            fx_rate,
        )
    });

    Ok(futures::future::join_all(futures).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_b_arbitrage_signal_and_spread() {
        let row = compute_row(
            "BTC",
            Some(VenueQuote { krw_price: 98_500_000.0, volume_24h_krw: 1.0, change_24h_pct: 0.0 }),
            Some(VenueQuote { krw_price: 98_200_000.0, volume_24h_krw: 1.0, change_24h_pct: 0.0 }),
            Some(VenueQuote { krw_price: 99_100_000.0, volume_24h_krw: 1.0, change_24h_pct: 0.0 }),
            Some(66_500.0),
            1450.0,
        );

        assert_eq!(row.best_buy_exchange.as_deref(), Some("upbit"));
        assert_eq!(row.best_sell_exchange.as_deref(), Some("coinone"));
        assert_eq!(row.action, ArbitrageSignal::Arbitrage);
        assert!((row.spread_pct.unwrap() - 0.92).abs() < 0.05);
    }

    #[test]
    fn hold_when_spread_below_threshold() {
        let row = compute_row(
            "ETH",
            Some(VenueQuote { krw_price: 4_700_000.0, volume_24h_krw: 1.0, change_24h_pct: 0.0 }),
            Some(VenueQuote { krw_price: 4_705_000.0, volume_24h_krw: 1.0, change_24h_pct: 0.0 }),
            None,
            Some(3_200.0),
            1450.0,
        );
        assert_eq!(row.action, ArbitrageSignal::Hold);
    }

    #[test]
    fn missing_global_price_still_returns_venue_data() {
        let row = compute_row(
            "XRP",
            Some(VenueQuote { krw_price: 3_000.0, volume_24h_krw: 1.0, change_24h_pct: 0.0 }),
            None,
            None,
            None,
            1450.0,
        );
        assert!(row.avg_premium_pct.is_none());
        assert!(row.bithumb.is_some());
    }
}
