// src/routes/mod.rs - Route modules
pub mod admin;
pub mod demo;
pub mod onchain;
pub mod premium;
pub mod registry;
pub mod route;

use axum::Router;

use crate::state::AppState;

/// Compose every API route group under a single router, nested at `/api`
/// by the caller.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/premium", premium::router())
        .nest("/route", route::router())
        .nest("/arbitrage", demo::router())
        .nest("/onchain", onchain::router())
        .nest("/registry", registry::router())
        .nest("/admin", admin::router())
}
