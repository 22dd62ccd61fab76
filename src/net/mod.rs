pub mod dns_cache;
pub mod http_client;
pub mod ssrf;

pub use http_client::{FetchLimits, FetchResponse, OutboundClient};
