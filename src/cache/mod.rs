pub mod bithumb;
pub mod fx;
pub mod global_prices;
pub mod single_flight;
pub mod usdc;

pub use bithumb::BithumbTickerCache;
pub use fx::FxRateCache;
pub use global_prices::GlobalPriceCache;
pub use usdc::UsdcReceiveCache;
