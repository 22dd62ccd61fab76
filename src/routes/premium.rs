// Paid endpoints nested under /api/premium.
use axum::routing::get;
use axum::Router;

use crate::handlers::{bithumb, cross_exchange, kimchi, opportunities, route};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/arbitrage/kimchi", get(kimchi::get_kimchi_premium))
        .route("/arbitrage/kimchi/history", get(kimchi::get_kimchi_history))
        .route("/arbitrage/opportunities", get(opportunities::get_opportunities))
        .route("/bithumb/orderbook", get(bithumb::get_orderbook))
        .route("/bithumb/volume-analysis", get(bithumb::get_volume_analysis))
        .route("/market/cross-exchange", get(cross_exchange::get_cross_exchange))
        .route("/route/find", get(route::find_route))
}
