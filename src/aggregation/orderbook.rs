// Bithumb per-pair orderbook depth — top-30 levels, fetched live per
// request. Feeds both the public orderbook endpoint and the Decision
// Layer's slippage estimator.
use serde::{Deserialize, Serialize};

use crate::aggregation::numeric::round2;
use crate::models::error::ApiError;
use crate::models::kimchi::OrderbookLevel;
use crate::net::{FetchLimits, OutboundClient};

const ORDERBOOK_URL: &str = "https://api.bithumb.com/public/orderbook";
const DEPTH_LIMIT: usize = 30;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderbookLevelView {
    pub price: f64,
    pub quantity: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderbookView {
    pub pair: String,
    pub bids: Vec<OrderbookLevelView>,
    pub asks: Vec<OrderbookLevelView>,
}

/// Fetch top-30 bids and asks for `pair` (e.g. `BTC`). Callers must tolerate
/// failure — there is no persisted fallback for orderbook depth.
pub async fn fetch_orderbook(
    client: &OutboundClient,
    pair: &str,
) -> Result<(Vec<OrderbookLevel>, Vec<OrderbookLevel>), ApiError> {
    #[derive(Deserialize)]
    struct Response {
        data: Data,
    }
    #[derive(Deserialize)]
    struct Data {
        bids: Vec<Level>,
        asks: Vec<Level>,
    }
    #[derive(Deserialize)]
    struct Level {
        price: String,
        quantity: String,
    }

    let url = format!("{ORDERBOOK_URL}/{}", pair.to_ascii_uppercase());
    let response: Response = client.fetch_json(&url, FetchLimits::default()).await?;

    let parse = |levels: Vec<Level>| -> Vec<OrderbookLevel> {
        levels
            .into_iter()
            .filter_map(|l| {
                Some(OrderbookLevel { price: l.price.parse().ok()?, quantity: l.quantity.parse().ok()? })
            })
            .take(DEPTH_LIMIT)
            .collect()
    };

    Ok((parse(response.data.bids), parse(response.data.asks)))
}

pub fn to_view(pair: &str, bids: &[OrderbookLevel], asks: &[OrderbookLevel]) -> OrderbookView {
    let map = |levels: &[OrderbookLevel]| {
        levels
            .iter()
            .map(|l| OrderbookLevelView { price: round2(l.price), quantity: round2(l.quantity) })
            .collect()
    };
    OrderbookView { pair: pair.to_string(), bids: map(bids), asks: map(asks) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_rounds_levels_to_two_decimals() {
        let bids = vec![OrderbookLevel { price: 98_500_000.123, quantity: 0.00123456 }];
        let view = to_view("BTC", &bids, &[]);
        assert_eq!(view.bids[0].price, 98_500_000.12);
        assert_eq!(view.pair, "BTC");
    }
}
