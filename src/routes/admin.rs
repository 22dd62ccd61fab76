// Admin-gated maintenance endpoints nested under /api/admin.
use axum::routing::post;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/registry/reseed", post(admin::reseed_registry))
        .route("/snapshot/trigger", post(admin::trigger_snapshot))
}
