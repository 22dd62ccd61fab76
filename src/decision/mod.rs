pub mod action;
pub mod slippage;
pub mod trend;

pub use action::{compute_action, market_condition, ActionDecision};
pub use slippage::slippage_from_asks;
pub use trend::{premium_trend, PremiumTrend, TrendDirection};
