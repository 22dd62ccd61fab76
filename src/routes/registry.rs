// Service discovery registry nested under /api/registry.
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::registry;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(registry::register_service))
        .route("/search", get(registry::search_services))
}
