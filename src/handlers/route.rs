// Paid GET /api/premium/route/find and the unpaid /api/route/{...}
// metadata endpoints.
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::error::ApiError;
use crate::models::route::RouteStrategy;
use crate::routing::engine::{find_optimal_route, OrderbookByCoin, RouteInputs};
use crate::routing::topology::{self, VenueKind};
use crate::state::AppState;

const SERVICE_NAME: &str = "crossfin-route-finder";

#[derive(Debug, Deserialize)]
pub struct FindRouteQuery {
    from: String,
    to: String,
    amount: f64,
    strategy: Option<String>,
}

pub async fn find_route(
    State(state): State<AppState>,
    Query(params): Query<FindRouteQuery>,
) -> Result<Json<Value>, ApiError> {
    let (from_venue, from_currency) = split_venue_currency(&params.from)?;
    let (to_venue, to_currency) = split_venue_currency(&params.to)?;
    let strategy = RouteStrategy::parse(params.strategy.as_deref());

    let fx_rate = state.fx_cache.get(&state.http_client).await;
    let bithumb = state.bithumb_cache.get(&state.http_client).await?;
    let global = state.global_price_cache.get(state.http_client.clone(), state.db.clone()).await?;

    let orderbook_futs = topology::TRACKED_SYMBOLS
        .iter()
        .map(|s| async move { (s.coin, crate::aggregation::orderbook::fetch_orderbook(&state.http_client, s.coin).await) });
    let fetched = futures::future::join_all(orderbook_futs).await;
    let asks_by_coin: Vec<(&str, Vec<_>)> = fetched
        .into_iter()
        .filter_map(|(coin, result)| result.ok().map(|(_, asks)| (coin, asks)))
        .collect();
    let orderbooks: OrderbookByCoin = asks_by_coin.iter().map(|(c, a)| (*c, a.as_slice())).collect();

    let inputs = RouteInputs {
        from_venue: &from_venue,
        from_currency: &from_currency,
        to_venue: &to_venue,
        to_currency: &to_currency,
        amount: params.amount,
        strategy,
    };
    let result = find_optimal_route(&state.db, inputs, &bithumb, &global, fx_rate, &orderbooks).await?;

    Ok(Json(json!({
        "paid": true,
        "service": SERVICE_NAME,
        "result": result,
        "at": Utc::now().to_rfc3339(),
    })))
}

fn split_venue_currency(value: &str) -> Result<(String, String), ApiError> {
    let mut parts = value.splitn(2, ':');
    let venue = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadInput("expected venue:currency".into()))?;
    let currency = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadInput("expected venue:currency".into()))?;
    Ok((venue.to_string(), currency.to_string()))
}

pub async fn list_exchanges() -> Json<Value> {
    let exchanges: Vec<Value> = topology::EXCHANGES
        .iter()
        .map(|e| {
            json!({
                "id": e.id,
                "displayName": e.display_name,
                "country": e.country,
                "kind": match e.kind {
                    VenueKind::KoreanKrw => "korean_krw",
                    VenueKind::GlobalUsd => "global_usd",
                },
                "tradingFeePct": e.trading_fee_pct,
            })
        })
        .collect();
    Json(json!({ "exchanges": exchanges }))
}

pub async fn list_fees() -> Json<Value> {
    let fees: Vec<Value> = topology::WITHDRAWAL_FEES
        .iter()
        .map(|((venue, coin), fee)| json!({ "venue": venue, "coin": coin, "withdrawalFee": fee }))
        .collect();
    Json(json!({ "fees": fees }))
}

pub async fn list_pairs() -> Json<Value> {
    let pairs: Vec<Value> = topology::TRACKED_SYMBOLS
        .iter()
        .map(|s| json!({ "coin": s.coin, "globalSymbol": s.global_symbol, "transferTimeMinutes": s.transfer_time_minutes }))
        .collect();
    Json(json!({ "pairs": pairs }))
}

pub async fn route_status() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "exchangesCount": topology::EXCHANGES.len(),
        "coinsCount": topology::TRACKED_SYMBOLS.len(),
    }))
}
