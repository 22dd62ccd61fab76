// BithumbVolumeAnalysis(bithumbMap, fxRate) — pure volume summary.
use serde::Serialize;

use crate::aggregation::numeric::round2;
use crate::cache::bithumb::BithumbMap;

const UNUSUAL_VOLUME_MULTIPLE: f64 = 2.0;
const UNUSUAL_VOLUME_LIMIT: usize = 50;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeRow {
    pub coin: String,
    pub volume_24h_krw: f64,
    pub volume_24h_usd: f64,
    pub change_24h_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeAnalysis {
    pub total_volume_24h_krw: f64,
    pub total_volume_24h_usd: f64,
    pub top_by_volume: Vec<VolumeRow>,
    pub top5_share_pct: f64,
    pub volume_weighted_change_pct: f64,
    pub unusual_volume_coins: Vec<String>,
}

pub fn bithumb_volume_analysis(bithumb: &BithumbMap, fx_rate: f64) -> VolumeAnalysis {
    if bithumb.is_empty() || fx_rate <= 0.0 {
        return VolumeAnalysis {
            total_volume_24h_krw: 0.0,
            total_volume_24h_usd: 0.0,
            top_by_volume: Vec::new(),
            top5_share_pct: 0.0,
            volume_weighted_change_pct: 0.0,
            unusual_volume_coins: Vec::new(),
        };
    }

    let mut rows: Vec<VolumeRow> = bithumb
        .iter()
        .map(|(coin, t)| VolumeRow {
            coin: coin.clone(),
            volume_24h_krw: t.volume_24h_krw,
            volume_24h_usd: t.volume_24h_krw / fx_rate,
            change_24h_pct: t.change_24h_pct,
        })
        .collect();
    rows.sort_by(|a, b| b.volume_24h_krw.partial_cmp(&a.volume_24h_krw).unwrap());

    let total_volume_24h_krw: f64 = rows.iter().map(|r| r.volume_24h_krw).sum();
    let top5_sum: f64 = rows.iter().take(5).map(|r| r.volume_24h_krw).sum();
    let top5_share_pct = if total_volume_24h_krw > 0.0 { top5_sum / total_volume_24h_krw * 100.0 } else { 0.0 };

    let volume_weighted_change_pct = if total_volume_24h_krw > 0.0 {
        rows.iter().map(|r| r.change_24h_pct * r.volume_24h_krw).sum::<f64>() / total_volume_24h_krw
    } else {
        0.0
    };

    let mean_volume = total_volume_24h_krw / rows.len() as f64;
    let unusual_volume_coins: Vec<String> = rows
        .iter()
        .filter(|r| r.volume_24h_krw > mean_volume * UNUSUAL_VOLUME_MULTIPLE)
        .take(UNUSUAL_VOLUME_LIMIT)
        .map(|r| r.coin.clone())
        .collect();

    VolumeAnalysis {
        total_volume_24h_krw: round2(total_volume_24h_krw),
        total_volume_24h_usd: round2(total_volume_24h_krw / fx_rate),
        top_by_volume: rows
            .into_iter()
            .take(20)
            .map(|r| VolumeRow {
                coin: r.coin,
                volume_24h_krw: round2(r.volume_24h_krw),
                volume_24h_usd: round2(r.volume_24h_usd),
                change_24h_pct: round2(r.change_24h_pct),
            })
            .collect(),
        top5_share_pct: round2(top5_share_pct),
        volume_weighted_change_pct: round2(volume_weighted_change_pct),
        unusual_volume_coins,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::bithumb::BithumbTicker;

    #[test]
    fn empty_input_yields_zeroed_summary() {
        let analysis = bithumb_volume_analysis(&BithumbMap::new(), 1450.0);
        assert_eq!(analysis.total_volume_24h_krw, 0.0);
        assert!(analysis.top_by_volume.is_empty());
    }

    #[test]
    fn flags_unusual_volume_coins() {
        let mut map = BithumbMap::new();
        map.insert("A".into(), BithumbTicker { closing_price: 1.0, volume_24h_krw: 100.0, change_24h_pct: 1.0 });
        map.insert("B".into(), BithumbTicker { closing_price: 1.0, volume_24h_krw: 100.0, change_24h_pct: 1.0 });
        map.insert("C".into(), BithumbTicker { closing_price: 1.0, volume_24h_krw: 10_000.0, change_24h_pct: 1.0 });

        let analysis = bithumb_volume_analysis(&map, 1450.0);
        assert!(analysis.unusual_volume_coins.contains(&"C".to_string()));
    }

    #[test]
    fn top5_share_never_exceeds_100_pct() {
        let mut map = BithumbMap::new();
        for i in 0..3 {
            map.insert(format!("C{i}"), BithumbTicker { closing_price: 1.0, volume_24h_krw: 100.0, change_24h_pct: 0.0 });
        }
        let analysis = bithumb_volume_analysis(&map, 1450.0);
        assert!(analysis.top5_share_pct <= 100.0);
    }
}
