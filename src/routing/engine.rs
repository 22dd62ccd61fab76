// findOptimalRoute — enumerates bridge-coin paths across the fixed topology,
// scores each with the Decision Layer, and ranks by strategy.
use sqlx::PgPool;

use crate::aggregation::numeric::round2;
use crate::cache::bithumb::BithumbMap;
use crate::cache::global_prices::GlobalPriceMap;
use crate::decision::{compute_action, premium_trend, slippage_from_asks};
use crate::models::error::ApiError;
use crate::models::kimchi::OrderbookLevel;
use crate::models::route::{
    Recommendation, Route, RouteDirection, RouteMeta, RouteResult, RouteStep, RouteStrategy, StepKind,
};
use crate::routing::topology::{self, VenueKind};

const GLOBAL_BUY_SLIPPAGE_PCT: f64 = 0.10;
const KOREAN_BUY_SLIPPAGE_DEFAULT_PCT: f64 = 0.15;
const FASTEST_TIME_NORMALIZER_MIN: f64 = 30.0;
const TRADE_EXECUTIONS_OVERHEAD_MIN: f64 = 1.0;
const HIGH_COST_SKIP_THRESHOLD_PCT: f64 = 2.0;
const PREMIUM_TREND_WINDOW_HOURS: i64 = 6;

const ALTERNATIVES_LIMIT: usize = 4;

pub struct RouteInputs<'a> {
    pub from_venue: &'a str,
    pub from_currency: &'a str,
    pub to_venue: &'a str,
    pub to_currency: &'a str,
    pub amount: f64,
    pub strategy: RouteStrategy,
}

/// Per-source-venue live orderbook top-N asks, keyed by coin. A missing
/// entry falls back to the documented default slippage.
pub type OrderbookByCoin<'a> = std::collections::HashMap<&'a str, &'a [OrderbookLevel]>;

pub async fn find_optimal_route(
    store: &PgPool,
    inputs: RouteInputs<'_>,
    bithumb: &BithumbMap,
    global: &GlobalPriceMap,
    fx_rate: f64,
    orderbooks: &OrderbookByCoin<'_>,
) -> Result<RouteResult, ApiError> {
    if !inputs.amount.is_finite() || inputs.amount <= 0.0 {
        return Err(ApiError::BadInput("amount must be a positive, finite number".into()));
    }

    let from_exchange = topology::find_exchange(inputs.from_venue)
        .ok_or_else(|| ApiError::BadInput(format!("unknown source venue '{}'", inputs.from_venue)))?;
    let to_exchange = topology::find_exchange(inputs.to_venue)
        .ok_or_else(|| ApiError::BadInput(format!("unknown destination venue '{}'", inputs.to_venue)))?;

    let direction = direction_of(from_exchange.kind, to_exchange.kind)
        .ok_or_else(|| ApiError::BadInput("unsupported venue direction".into()))?;

    let mut evaluated = Vec::new();
    let mut skipped = Vec::new();
    let mut venue_prices = Vec::new();
    let mut routes = Vec::new();

    for symbol in topology::TRACKED_SYMBOLS {
        let coin = symbol.coin;

        let Some(withdrawal_fee) = topology::withdrawal_fee(from_exchange.id, coin) else {
            skipped.push(coin.to_string());
            continue;
        };

        let buy_price = match direction {
            RouteDirection::GlobalToKorea => global.get(coin).copied(),
            _ => bithumb.get(coin).map(|t| t.closing_price),
        };
        let Some(buy_price) = buy_price.filter(|p| *p > 0.0) else {
            skipped.push(coin.to_string());
            continue;
        };

        let sell_price = match to_exchange.kind {
            VenueKind::GlobalUsd => global.get(coin).copied(),
            VenueKind::KoreanKrw => bithumb.get(coin).map(|t| t.closing_price),
        };
        let Some(sell_price) = sell_price.filter(|p| *p > 0.0) else {
            skipped.push(coin.to_string());
            continue;
        };

        venue_prices.push((coin.to_string(), buy_price));

        let route = build_route(
            store,
            &inputs,
            from_exchange,
            to_exchange,
            symbol,
            buy_price,
            sell_price,
            withdrawal_fee,
            fx_rate,
            orderbooks.get(coin).copied(),
        )
        .await;

        match route {
            Some(route) => {
                evaluated.push(coin.to_string());
                routes.push(route);
            }
            None => skipped.push(coin.to_string()),
        }
    }

    routes.sort_by(|a, b| score(&inputs.strategy, a).partial_cmp(&score(&inputs.strategy, b)).unwrap());

    let optimal = routes.first().cloned();
    let alternatives = routes.into_iter().skip(1).take(ALTERNATIVES_LIMIT).collect();

    Ok(RouteResult {
        optimal,
        alternatives,
        meta: RouteMeta {
            evaluated_coins: evaluated,
            skipped_coins: skipped,
            fx_rate_used: fx_rate,
            venue_prices,
        },
    })
}

fn direction_of(from: VenueKind, to: VenueKind) -> Option<RouteDirection> {
    match (from, to) {
        (VenueKind::KoreanKrw, VenueKind::GlobalUsd) => Some(RouteDirection::KoreaToGlobal),
        (VenueKind::GlobalUsd, VenueKind::KoreanKrw) => Some(RouteDirection::GlobalToKorea),
        (VenueKind::KoreanKrw, VenueKind::KoreanKrw) => Some(RouteDirection::Domestic),
        (VenueKind::GlobalUsd, VenueKind::GlobalUsd) => None,
    }
}

#[allow(clippy::too_many_arguments)]
async fn build_route(
    store: &PgPool,
    inputs: &RouteInputs<'_>,
    from_exchange: &topology::Exchange,
    to_exchange: &topology::Exchange,
    symbol: &topology::TrackedSymbol,
    buy_price: f64,
    sell_price: f64,
    withdrawal_fee: f64,
    fx_rate: f64,
    asks: Option<&[OrderbookLevel]>,
) -> Option<Route> {
    let is_global_buy = matches!(from_exchange.kind, VenueKind::GlobalUsd);

    let buy_slippage_pct = if is_global_buy {
        GLOBAL_BUY_SLIPPAGE_PCT
    } else {
        match asks {
            Some(levels) => slippage_from_asks(levels, inputs.amount),
            None => KOREAN_BUY_SLIPPAGE_DEFAULT_PCT,
        }
    };

    let after_fee = inputs.amount * (1.0 - from_exchange.trading_fee_pct / 100.0);
    let coins_bought = after_fee / (buy_price * (1.0 + buy_slippage_pct / 100.0));
    if !coins_bought.is_finite() || coins_bought <= 0.0 {
        return None;
    }

    let coins_after_withdrawal = coins_bought - withdrawal_fee;
    if coins_after_withdrawal <= 0.0 {
        return None;
    }
    let transfer_time_min = topology::transfer_time_minutes(symbol.coin);

    let dest_is_global = matches!(to_exchange.kind, VenueKind::GlobalUsd);
    let output = coins_after_withdrawal * sell_price * (1.0 - to_exchange.trading_fee_pct / 100.0);
    if !output.is_finite() || output <= 0.0 {
        return None;
    }

    let input_value_usd = if inputs.from_currency.eq_ignore_ascii_case("KRW") {
        inputs.amount / fx_rate
    } else {
        inputs.amount
    };
    let output_value_usd = if dest_is_global { output } else { output / fx_rate };
    if input_value_usd <= 0.0 {
        return None;
    }

    let total_cost_pct = (input_value_usd - output_value_usd) / input_value_usd * 100.0;
    let total_time_minutes = transfer_time_min + TRADE_EXECUTIONS_OVERHEAD_MIN;

    let trend = premium_trend(store, symbol.coin, PREMIUM_TREND_WINDOW_HOURS).await;
    let mut decision = compute_action(-total_cost_pct, buy_slippage_pct, transfer_time_min, trend.volatility_pct);

    if total_cost_pct >= HIGH_COST_SKIP_THRESHOLD_PCT {
        decision.action = crate::models::route::RouteAction::Skip;
        decision.reason = format!("total cost {:.2}% exceeds the high-cost threshold", round2(total_cost_pct));
    }

    let buy_step = RouteStep {
        kind: StepKind::Buy,
        from_exchange: from_exchange.id.to_string(),
        from_currency: inputs.from_currency.to_string(),
        to_exchange: from_exchange.id.to_string(),
        to_currency: symbol.coin.to_string(),
        fee_pct: round2(from_exchange.trading_fee_pct),
        fee_absolute: round2(inputs.amount - after_fee),
        slippage_pct: round2(buy_slippage_pct),
        time_minutes: round2(TRADE_EXECUTIONS_OVERHEAD_MIN / 2.0),
        price_used: round2(buy_price),
        amount_in: round2(inputs.amount),
        amount_out: round2(coins_bought),
    };

    let transfer_step = RouteStep {
        kind: StepKind::Transfer,
        from_exchange: from_exchange.id.to_string(),
        from_currency: symbol.coin.to_string(),
        to_exchange: to_exchange.id.to_string(),
        to_currency: symbol.coin.to_string(),
        fee_pct: 0.0,
        fee_absolute: round2(withdrawal_fee),
        slippage_pct: 0.0,
        time_minutes: round2(transfer_time_min),
        price_used: round2(buy_price),
        amount_in: round2(coins_bought),
        amount_out: round2(coins_after_withdrawal),
    };

    let sell_step = RouteStep {
        kind: StepKind::Sell,
        from_exchange: to_exchange.id.to_string(),
        from_currency: symbol.coin.to_string(),
        to_exchange: to_exchange.id.to_string(),
        to_currency: inputs.to_currency.to_string(),
        fee_pct: round2(to_exchange.trading_fee_pct),
        fee_absolute: round2(coins_after_withdrawal * sell_price * to_exchange.trading_fee_pct / 100.0),
        slippage_pct: 0.0,
        time_minutes: round2(TRADE_EXECUTIONS_OVERHEAD_MIN / 2.0),
        price_used: round2(sell_price),
        amount_in: round2(coins_after_withdrawal),
        amount_out: round2(output),
    };

    let recommendation = recommendation_bucket(total_cost_pct);
    let summary = format!(
        "Buy {} on {}, transfer to {} ({:.1} min), sell for {}; total cost {:.2}% ({:?})",
        symbol.coin,
        from_exchange.display_name,
        to_exchange.display_name,
        transfer_time_min,
        inputs.to_currency,
        round2(total_cost_pct),
        recommendation,
    );

    Some(Route {
        from_venue: from_exchange.id.to_string(),
        from_currency: inputs.from_currency.to_string(),
        to_venue: to_exchange.id.to_string(),
        to_currency: inputs.to_currency.to_string(),
        input_amount: round2(inputs.amount),
        bridge_coin: symbol.coin.to_string(),
        steps: vec![buy_step, transfer_step, sell_step],
        total_cost_pct: round2(total_cost_pct),
        total_time_minutes: round2(total_time_minutes),
        estimated_output: round2(output),
        action: decision.action,
        confidence: decision.confidence,
        recommendation,
        summary,
    })
}

fn recommendation_bucket(total_cost_pct: f64) -> Recommendation {
    if total_cost_pct < 1.0 {
        Recommendation::GoodDeal
    } else if total_cost_pct < 3.0 {
        Recommendation::Proceed
    } else if total_cost_pct < 5.0 {
        Recommendation::Expensive
    } else {
        Recommendation::VeryExpensive
    }
}

fn score(strategy: &RouteStrategy, route: &Route) -> f64 {
    match strategy {
        RouteStrategy::Cheapest => route.total_cost_pct,
        RouteStrategy::Fastest => route.total_time_minutes,
        RouteStrategy::Balanced => 0.7 * route.total_cost_pct + 0.3 * (route.total_time_minutes / FASTEST_TIME_NORMALIZER_MIN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_buckets_match_thresholds() {
        assert_eq!(recommendation_bucket(0.5), Recommendation::GoodDeal);
        assert_eq!(recommendation_bucket(2.0), Recommendation::Proceed);
        assert_eq!(recommendation_bucket(4.0), Recommendation::Expensive);
        assert_eq!(recommendation_bucket(6.0), Recommendation::VeryExpensive);
    }

    #[test]
    fn direction_rejects_global_to_global() {
        assert!(direction_of(VenueKind::GlobalUsd, VenueKind::GlobalUsd).is_none());
    }

    #[test]
    fn direction_accepts_documented_combinations() {
        assert_eq!(direction_of(VenueKind::KoreanKrw, VenueKind::GlobalUsd), Some(RouteDirection::KoreaToGlobal));
        assert_eq!(direction_of(VenueKind::GlobalUsd, VenueKind::KoreanKrw), Some(RouteDirection::GlobalToKorea));
        assert_eq!(direction_of(VenueKind::KoreanKrw, VenueKind::KoreanKrw), Some(RouteDirection::Domestic));
    }

    #[test]
    fn balanced_score_uses_documented_normalizer() {
        let route = Route {
            from_venue: "bithumb".into(),
            from_currency: "KRW".into(),
            to_venue: "binance".into(),
            to_currency: "USDC".into(),
            input_amount: 1000.0,
            bridge_coin: "XRP".into(),
            steps: vec![],
            total_cost_pct: 1.0,
            total_time_minutes: 30.0,
            estimated_output: 990.0,
            action: crate::models::route::RouteAction::Execute,
            confidence: 0.9,
            recommendation: Recommendation::GoodDeal,
            summary: String::new(),
        };
        assert_eq!(score(&RouteStrategy::Balanced, &route), 0.7 * 1.0 + 0.3 * 1.0);
    }
}
