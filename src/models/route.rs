// Routing Engine output types. Built per request, never persisted.
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Buy,
    Transfer,
    Sell,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    pub kind: StepKind,
    pub from_exchange: String,
    pub from_currency: String,
    pub to_exchange: String,
    pub to_currency: String,
    pub fee_pct: f64,
    pub fee_absolute: f64,
    pub slippage_pct: f64,
    pub time_minutes: f64,
    pub price_used: f64,
    pub amount_in: f64,
    pub amount_out: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteAction {
    Execute,
    Wait,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    GoodDeal,
    Proceed,
    Expensive,
    VeryExpensive,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub from_venue: String,
    pub from_currency: String,
    pub to_venue: String,
    pub to_currency: String,
    pub input_amount: f64,
    pub bridge_coin: String,
    pub steps: Vec<RouteStep>,
    pub total_cost_pct: f64,
    pub total_time_minutes: f64,
    pub estimated_output: f64,
    pub action: RouteAction,
    pub confidence: f64,
    pub recommendation: Recommendation,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStrategy {
    Cheapest,
    Fastest,
    Balanced,
}

impl RouteStrategy {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("fastest") => Self::Fastest,
            Some("balanced") => Self::Balanced,
            _ => Self::Cheapest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDirection {
    KoreaToGlobal,
    GlobalToKorea,
    Domestic,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMeta {
    pub evaluated_coins: Vec<String>,
    pub skipped_coins: Vec<String>,
    pub fx_rate_used: f64,
    pub venue_prices: Vec<(String, f64)>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub optimal: Option<Route>,
    pub alternatives: Vec<Route>,
    pub meta: RouteMeta,
}
