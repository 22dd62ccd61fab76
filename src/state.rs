// src/state.rs - Application State with Dependency Injection
use std::sync::Arc;

use crate::cache::{BithumbTickerCache, FxRateCache, GlobalPriceCache, UsdcReceiveCache};
use crate::config::AppConfig;
use crate::middleware::rate_limit::{ProxyRateLimiter, PublicRateLimiter};
use crate::net::OutboundClient;

/// Application state with dependency injection for all services. The five
/// cache singletons and the two rate-limit maps are the only process-wide
/// shared mutable state (spec §5, §9).
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: AppConfig,
    pub http_client: Arc<OutboundClient>,
    pub fx_cache: Arc<FxRateCache>,
    pub bithumb_cache: Arc<BithumbTickerCache>,
    pub global_price_cache: Arc<GlobalPriceCache>,
    pub usdc_cache: Arc<UsdcReceiveCache>,
    pub public_rate_limiter: Arc<PublicRateLimiter>,
    pub proxy_rate_limiter: Arc<ProxyRateLimiter>,
    pub metrics: Arc<metrics_exporter_prometheus::PrometheusHandle>,
}

impl AppState {
    pub async fn new(db: sqlx::PgPool, config: AppConfig) -> anyhow::Result<Self> {
        let http_client = Arc::new(OutboundClient::new()?);

        let fx_cache = Arc::new(FxRateCache::new());
        let bithumb_cache = Arc::new(BithumbTickerCache::new());
        let global_price_cache = Arc::new(GlobalPriceCache::new());
        let usdc_cache = Arc::new(UsdcReceiveCache::new(
            config.usdc_contract_address.clone(),
            config.payment_receiver_address.clone(),
        ));

        let public_rate_limiter = Arc::new(PublicRateLimiter::new());
        let proxy_rate_limiter = Arc::new(ProxyRateLimiter::new());

        let metrics = metrics_exporter_prometheus::PrometheusBuilder::new()
            .build_recorder()
            .handle();
        let metrics = Arc::new(metrics);

        tracing::info!("AppState initialized: http client, 4 in-process caches, 2 rate limiters");

        Ok(Self {
            db,
            config,
            http_client,
            fx_cache,
            bithumb_cache,
            global_price_cache,
            usdc_cache,
            public_rate_limiter,
            proxy_rate_limiter,
            metrics,
        })
    }
}
