// Unpaid routing metadata nested under /api/route.
use axum::routing::get;
use axum::Router;

use crate::handlers::route;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/exchanges", get(route::list_exchanges))
        .route("/fees", get(route::list_fees))
        .route("/pairs", get(route::list_pairs))
        .route("/status", get(route::route_status))
}
