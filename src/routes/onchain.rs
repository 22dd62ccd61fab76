// On-chain receive history nested under /api/onchain.
use axum::routing::get;
use axum::Router;

use crate::handlers::onchain;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/usdc-transfers", get(onchain::get_usdc_transfers))
}
