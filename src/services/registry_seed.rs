// Cold-start and on-demand registry bootstrap with a fixed seed list of
// market-data services, mixing paid and free, crypto and Korean-equities.
use sqlx::PgPool;

use crossfin_store::registry::NewService;

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    crossfin_store::registry::seed_if_empty(pool, seed_list()).await
}

fn seed_list() -> Vec<NewService> {
    vec![
        NewService {
            name: "CoinGecko Market Data".into(),
            description: Some("Free global crypto prices".into()),
            endpoint: "https://api.coingecko.com/api/v3".into(),
            category: "crypto".into(),
            is_paid: false,
            metadata: serde_json::json!({}),
        },
        NewService {
            name: "Binance Public API".into(),
            description: Some("Free global exchange tickers".into()),
            endpoint: "https://api.binance.com/api/v3".into(),
            category: "crypto".into(),
            is_paid: false,
            metadata: serde_json::json!({}),
        },
        NewService {
            name: "Bithumb Public API".into(),
            description: Some("Free Korean exchange tickers".into()),
            endpoint: "https://api.bithumb.com/public".into(),
            category: "crypto".into(),
            is_paid: false,
            metadata: serde_json::json!({}),
        },
        NewService {
            name: "Upbit Public API".into(),
            description: Some("Free Korean exchange tickers".into()),
            endpoint: "https://api.upbit.com/v1".into(),
            category: "crypto".into(),
            is_paid: false,
            metadata: serde_json::json!({}),
        },
        NewService {
            name: "Coinone Public API".into(),
            description: Some("Free Korean exchange tickers".into()),
            endpoint: "https://api.coinone.co.kr/public".into(),
            category: "crypto".into(),
            is_paid: false,
            metadata: serde_json::json!({}),
        },
        NewService {
            name: "CryptoCompare News".into(),
            description: Some("Free market headlines".into()),
            endpoint: "https://min-api.cryptocompare.com/data/v2/news".into(),
            category: "news".into(),
            is_paid: false,
            metadata: serde_json::json!({}),
        },
        NewService {
            name: "Yahoo Finance KOSPI".into(),
            description: Some("Free Korean index quote".into()),
            endpoint: "https://query1.finance.yahoo.com/v8/finance/chart".into(),
            category: "stocks".into(),
            is_paid: false,
            metadata: serde_json::json!({}),
        },
        NewService {
            name: "CrossFin Kimchi Premium".into(),
            description: Some("Paid kimchi-premium aggregate".into()),
            endpoint: "https://crossfin.dev/api/premium/arbitrage/kimchi".into(),
            category: "crypto".into(),
            is_paid: true,
            metadata: serde_json::json!({}),
        },
        NewService {
            name: "CrossFin Routing Engine".into(),
            description: Some("Paid bridge-coin routing plans".into()),
            endpoint: "https://crossfin.dev/api/premium/route/find".into(),
            category: "routing".into(),
            is_paid: true,
            metadata: serde_json::json!({}),
        },
        NewService {
            name: "CrossFin Cross-Exchange".into(),
            description: Some("Paid cross-exchange comparison".into()),
            endpoint: "https://crossfin.dev/api/premium/market/cross-exchange".into(),
            category: "crypto".into(),
            is_paid: true,
            metadata: serde_json::json!({}),
        },
        NewService {
            name: "Exchangerate.host FX".into(),
            description: Some("Free USD/KRW FX rate".into()),
            endpoint: "https://api.exchangerate.host/latest".into(),
            category: "fx".into(),
            is_paid: false,
            metadata: serde_json::json!({}),
        },
        NewService {
            name: "Base RPC (public)".into(),
            description: Some("Free on-chain RPC for USDC receives".into()),
            endpoint: "https://mainnet.base.org".into(),
            category: "onchain".into(),
            is_paid: false,
            metadata: serde_json::json!({}),
        },
    ]
}
