// MorningBrief, CryptoSnapshot, KimchiStats, StockBrief — bundle responses
// composing several aggregators plus independent live fetches. Any one
// sub-fetch failing yields an empty/null slot, never a failed response.
use serde::{Deserialize, Serialize};

use crate::aggregation::kimchi::kimchi_rows;
use crate::aggregation::numeric::round2;
use crate::aggregation::volume::{bithumb_volume_analysis, VolumeAnalysis};
use crate::cache::bithumb::BithumbMap;
use crate::cache::global_prices::GlobalPriceMap;
use crate::models::kimchi::KimchiRow;
use crate::net::{FetchLimits, OutboundClient};

const KOREAN_INDEX_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart/%5EKS11";
const NEWS_HEADLINES_URL: &str = "https://min-api.cryptocompare.com/data/v2/news/?lang=EN";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KoreanIndexSnapshot {
    pub symbol: String,
    pub value: f64,
    pub change_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsHeadline {
    pub title: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KimchiStats {
    pub pairs_tracked: usize,
    pub avg_premium_pct: f64,
    pub top_premium: Option<KimchiRow>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoSnapshot {
    pub rows: Vec<KimchiRow>,
    pub volume: VolumeAnalysis,
    pub fx_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockBrief {
    pub korean_index: Option<KoreanIndexSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MorningBrief {
    pub crypto: CryptoSnapshot,
    pub stocks: StockBrief,
    pub headlines: Vec<NewsHeadline>,
}

pub fn kimchi_stats(rows: &[KimchiRow]) -> KimchiStats {
    let avg_premium_pct = if rows.is_empty() {
        0.0
    } else {
        round2(rows.iter().map(|r| r.premium_pct).sum::<f64>() / rows.len() as f64)
    };

    KimchiStats {
        pairs_tracked: rows.len(),
        avg_premium_pct,
        top_premium: rows.first().cloned(),
    }
}

pub fn crypto_snapshot(bithumb: &BithumbMap, global: &GlobalPriceMap, fx_rate: f64) -> CryptoSnapshot {
    CryptoSnapshot {
        rows: kimchi_rows(bithumb, global, fx_rate),
        volume: bithumb_volume_analysis(bithumb, fx_rate),
        fx_rate,
    }
}

/// Best-effort fetch of the KOSPI index; `None` on any failure, never
/// propagated as an error.
pub async fn fetch_korean_index(client: &OutboundClient) -> Option<KoreanIndexSnapshot> {
    #[derive(Deserialize)]
    struct Response {
        chart: Chart,
    }
    #[derive(Deserialize)]
    struct Chart {
        result: Vec<ChartResult>,
    }
    #[derive(Deserialize)]
    struct ChartResult {
        meta: Meta,
    }
    #[derive(Deserialize)]
    struct Meta {
        symbol: String,
        #[serde(rename = "regularMarketPrice")]
        regular_market_price: f64,
        #[serde(rename = "previousClose")]
        previous_close: f64,
    }

    let response: Response = client.fetch_json(KOREAN_INDEX_URL, FetchLimits::default()).await.ok()?;
    let meta = response.chart.result.into_iter().next()?.meta;
    if meta.previous_close <= 0.0 {
        return None;
    }

    Some(KoreanIndexSnapshot {
        symbol: meta.symbol,
        value: round2(meta.regular_market_price),
        change_pct: round2((meta.regular_market_price - meta.previous_close) / meta.previous_close * 100.0),
    })
}

/// Best-effort fetch of a short list of market headlines; empty on failure.
pub async fn fetch_news_headlines(client: &OutboundClient, limit: usize) -> Vec<NewsHeadline> {
    #[derive(Deserialize)]
    struct Response {
        #[serde(rename = "Data")]
        data: Vec<Article>,
    }
    #[derive(Deserialize)]
    struct Article {
        title: String,
        source: String,
    }

    let response: Result<Response, _> = client.fetch_json(NEWS_HEADLINES_URL, FetchLimits::default()).await;
    match response {
        Ok(r) => r
            .data
            .into_iter()
            .take(limit)
            .map(|a| NewsHeadline { title: a.title, source: a.source })
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Compose the morning brief via allSettled-equivalent concurrency: each
/// independent fetch is wrapped so a failure yields an empty slot rather
/// than failing the whole bundle.
pub async fn morning_brief(
    client: &OutboundClient,
    bithumb: &BithumbMap,
    global: &GlobalPriceMap,
    fx_rate: f64,
) -> MorningBrief {
    let (korean_index, headlines) =
        tokio::join!(fetch_korean_index(client), fetch_news_headlines(client, 5));

    MorningBrief {
        crypto: crypto_snapshot(bithumb, global, fx_rate),
        stocks: StockBrief { korean_index },
        headlines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kimchi_stats_on_empty_rows_is_zeroed_not_failed() {
        let stats = kimchi_stats(&[]);
        assert_eq!(stats.pairs_tracked, 0);
        assert_eq!(stats.avg_premium_pct, 0.0);
        assert!(stats.top_premium.is_none());
    }

    #[test]
    fn kimchi_stats_averages_premiums() {
        let rows = vec![
            KimchiRow {
                coin: "BTC".into(),
                bithumb_krw: 0.0,
                bithumb_usd: 0.0,
                binance_usd: 0.0,
                premium_pct: 2.0,
                volume_24h_krw: 0.0,
                volume_24h_usd: 0.0,
                change_24h_pct: 0.0,
            },
            KimchiRow {
                coin: "ETH".into(),
                bithumb_krw: 0.0,
                bithumb_usd: 0.0,
                binance_usd: 0.0,
                premium_pct: 1.0,
                volume_24h_krw: 0.0,
                volume_24h_usd: 0.0,
                change_24h_pct: 0.0,
            },
        ];
        let stats = kimchi_stats(&rows);
        assert_eq!(stats.avg_premium_pct, 1.5);
        assert_eq!(stats.top_premium.unwrap().coin, "BTC");
    }
}
