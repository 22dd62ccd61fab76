pub mod bundles;
pub mod cross_exchange;
pub mod history;
pub mod kimchi;
pub mod numeric;
pub mod orderbook;
pub mod volume;
