// Unpaid demo showcase nested under /api/arbitrage.
use axum::routing::get;
use axum::Router;

use crate::handlers::demo;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/demo", get(demo::get_demo))
}
