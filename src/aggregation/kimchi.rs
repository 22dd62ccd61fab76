// KimchiRows(bithumbMap, globalMap, fxRate) — pure, tolerant of missing coins.
use std::collections::HashMap;

use crate::aggregation::numeric::round2;
use crate::cache::bithumb::BithumbMap;
use crate::cache::global_prices::GlobalPriceMap;
use crate::models::kimchi::KimchiRow;
use crate::routing::topology::TRACKED_SYMBOLS;

/// Build one row per tracked coin with both a Bithumb price and a global
/// price; coins missing either source are silently omitted. Sorted
/// descending by absolute premium.
pub fn kimchi_rows(bithumb: &BithumbMap, global: &GlobalPriceMap, fx_rate: f64) -> Vec<KimchiRow> {
    let mut rows: Vec<KimchiRow> = TRACKED_SYMBOLS
        .iter()
        .filter_map(|symbol| {
            let ticker = bithumb.get(symbol.coin)?;
            let binance_usd = *global.get(symbol.coin)?;
            if binance_usd <= 0.0 || fx_rate <= 0.0 {
                return None;
            }

            let bithumb_usd = ticker.closing_price / fx_rate;
            let premium_pct = (bithumb_usd - binance_usd) / binance_usd * 100.0;
            if !premium_pct.is_finite() {
                return None;
            }

            Some(KimchiRow {
                coin: symbol.coin.to_string(),
                bithumb_krw: round2(ticker.closing_price),
                bithumb_usd: round2(bithumb_usd),
                binance_usd: round2(binance_usd),
                premium_pct: round2(premium_pct),
                volume_24h_krw: round2(ticker.volume_24h_krw),
                volume_24h_usd: round2(ticker.volume_24h_krw / fx_rate),
                change_24h_pct: round2(ticker.change_24h_pct),
            })
        })
        .collect();

    rows.sort_by(|a, b| b.premium_pct.abs().partial_cmp(&a.premium_pct.abs()).unwrap());
    rows
}

pub fn by_coin(rows: &[KimchiRow]) -> HashMap<&str, &KimchiRow> {
    rows.iter().map(|r| (r.coin.as_str(), r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::bithumb::BithumbTicker;

    #[test]
    fn computes_premium_and_sorts_descending_by_magnitude() {
        let mut bithumb = BithumbMap::new();
        bithumb.insert("BTC".into(), BithumbTicker { closing_price: 98_500_000.0, volume_24h_krw: 1.0e12, change_24h_pct: 1.2 });
        bithumb.insert("ETH".into(), BithumbTicker { closing_price: 4_700_000.0, volume_24h_krw: 5.0e11, change_24h_pct: -0.5 });

        let mut global = GlobalPriceMap::new();
        global.insert("BTC".into(), 66_500.0);
        global.insert("ETH".into(), 3_200.0);

        let rows = kimchi_rows(&bithumb, &global, 1450.0);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].premium_pct.abs() >= rows[1].premium_pct.abs());
        assert!((rows[0].premium_pct - ((98_500_000.0 / 1450.0 - 66_500.0) / 66_500.0 * 100.0)).abs() < 0.5);
    }

    #[test]
    fn omits_coins_missing_either_source() {
        let mut bithumb = BithumbMap::new();
        bithumb.insert("XRP".into(), BithumbTicker { closing_price: 3000.0, volume_24h_krw: 1.0e9, change_24h_pct: 0.0 });
        let global = GlobalPriceMap::new(); // no XRP price

        let rows = kimchi_rows(&bithumb, &global, 1450.0);
        assert!(rows.is_empty());
    }
}
