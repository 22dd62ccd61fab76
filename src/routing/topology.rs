// Static, compile-time topology of exchanges and bridge coins.
use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
pub struct TrackedSymbol {
    pub coin: &'static str,
    pub global_symbol: &'static str,
    pub coingecko_id: &'static str,
    pub transfer_time_minutes: f64,
}

pub const TRACKED_SYMBOLS: &[TrackedSymbol] = &[
    TrackedSymbol { coin: "BTC", global_symbol: "BTCUSDT", coingecko_id: "bitcoin", transfer_time_minutes: 30.0 },
    TrackedSymbol { coin: "ETH", global_symbol: "ETHUSDT", coingecko_id: "ethereum", transfer_time_minutes: 5.0 },
    TrackedSymbol { coin: "XRP", global_symbol: "XRPUSDT", coingecko_id: "ripple", transfer_time_minutes: 4.0 },
    TrackedSymbol { coin: "USDT", global_symbol: "USDTUSDT", coingecko_id: "tether", transfer_time_minutes: 5.0 },
    TrackedSymbol { coin: "USDC", global_symbol: "USDCUSDT", coingecko_id: "usd-coin", transfer_time_minutes: 5.0 },
    TrackedSymbol { coin: "SOL", global_symbol: "SOLUSDT", coingecko_id: "solana", transfer_time_minutes: 2.0 },
    TrackedSymbol { coin: "ADA", global_symbol: "ADAUSDT", coingecko_id: "cardano", transfer_time_minutes: 5.0 },
    TrackedSymbol { coin: "DOGE", global_symbol: "DOGEUSDT", coingecko_id: "dogecoin", transfer_time_minutes: 10.0 },
    TrackedSymbol { coin: "TRX", global_symbol: "TRXUSDT", coingecko_id: "tron", transfer_time_minutes: 3.0 },
    TrackedSymbol { coin: "DOT", global_symbol: "DOTUSDT", coingecko_id: "polkadot", transfer_time_minutes: 5.0 },
    TrackedSymbol { coin: "MATIC", global_symbol: "MATICUSDT", coingecko_id: "matic-network", transfer_time_minutes: 3.0 },
];

pub fn transfer_time_minutes(coin: &str) -> f64 {
    TRACKED_SYMBOLS
        .iter()
        .find(|s| s.coin == coin)
        .map(|s| s.transfer_time_minutes)
        .unwrap_or(10.0) // spec default when unknown
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenueKind {
    KoreanKrw,
    GlobalUsd,
}

#[derive(Debug, Clone, Copy)]
pub struct Exchange {
    pub id: &'static str,
    pub display_name: &'static str,
    pub country: &'static str,
    pub kind: VenueKind,
    pub trading_fee_pct: f64,
}

pub const EXCHANGES: &[Exchange] = &[
    Exchange { id: "bithumb", display_name: "Bithumb", country: "KR", kind: VenueKind::KoreanKrw, trading_fee_pct: 0.25 },
    Exchange { id: "upbit", display_name: "Upbit", country: "KR", kind: VenueKind::KoreanKrw, trading_fee_pct: 0.25 },
    Exchange { id: "coinone", display_name: "Coinone", country: "KR", kind: VenueKind::KoreanKrw, trading_fee_pct: 0.20 },
    Exchange { id: "korbit", display_name: "Korbit", country: "KR", kind: VenueKind::KoreanKrw, trading_fee_pct: 0.20 },
    Exchange { id: "binance", display_name: "Binance", country: "global", kind: VenueKind::GlobalUsd, trading_fee_pct: 0.10 },
];

pub fn find_exchange(id: &str) -> Option<&'static Exchange> {
    EXCHANGES.iter().find(|e| e.id.eq_ignore_ascii_case(id))
}

/// Per-venue withdrawal fee table, denominated in coin units.
pub static WITHDRAWAL_FEES: Lazy<HashMap<(&'static str, &'static str), f64>> = Lazy::new(|| {
    HashMap::from([
        (("bithumb", "BTC"), 0.0005), (("bithumb", "ETH"), 0.003), (("bithumb", "XRP"), 1.0),
        (("bithumb", "USDT"), 5.0), (("bithumb", "USDC"), 5.0), (("bithumb", "SOL"), 0.01),
        (("bithumb", "ADA"), 1.0), (("bithumb", "DOGE"), 5.0), (("bithumb", "TRX"), 1.0),
        (("bithumb", "DOT"), 0.1), (("bithumb", "MATIC"), 2.0),
        (("upbit", "BTC"), 0.0005), (("upbit", "ETH"), 0.01), (("upbit", "XRP"), 1.0),
        (("upbit", "USDT"), 1.0), (("upbit", "USDC"), 5.0), (("upbit", "SOL"), 0.01),
        (("upbit", "ADA"), 2.0), (("upbit", "DOGE"), 10.0), (("upbit", "TRX"), 1.0),
        (("upbit", "DOT"), 0.1), (("upbit", "MATIC"), 3.0),
        (("coinone", "BTC"), 0.0008), (("coinone", "ETH"), 0.01), (("coinone", "XRP"), 1.0),
        (("coinone", "USDT"), 3.0), (("coinone", "USDC"), 5.0), (("coinone", "SOL"), 0.02),
        (("coinone", "ADA"), 2.0), (("coinone", "DOGE"), 10.0), (("coinone", "TRX"), 1.0),
        (("coinone", "DOT"), 0.2), (("coinone", "MATIC"), 3.0),
        (("korbit", "BTC"), 0.001), (("korbit", "ETH"), 0.01), (("korbit", "XRP"), 1.0),
        (("korbit", "USDT"), 5.0), (("korbit", "USDC"), 5.0), (("korbit", "SOL"), 0.02),
        (("korbit", "ADA"), 2.0), (("korbit", "DOGE"), 10.0), (("korbit", "TRX"), 1.0),
        (("korbit", "DOT"), 0.2), (("korbit", "MATIC"), 3.0),
        (("binance", "BTC"), 0.0002), (("binance", "ETH"), 0.002), (("binance", "XRP"), 0.25),
        (("binance", "USDT"), 1.0), (("binance", "USDC"), 1.0), (("binance", "SOL"), 0.005),
        (("binance", "ADA"), 0.5), (("binance", "DOGE"), 2.0), (("binance", "TRX"), 0.5),
        (("binance", "DOT"), 0.05), (("binance", "MATIC"), 0.5),
    ])
});

pub fn withdrawal_fee(venue: &str, coin: &str) -> Option<f64> {
    WITHDRAWAL_FEES.get(&(venue, coin)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topology_has_five_exchanges_and_eleven_coins() {
        assert_eq!(EXCHANGES.len(), 5);
        assert_eq!(TRACKED_SYMBOLS.len(), 11);
    }

    #[test]
    fn unknown_coin_falls_back_to_ten_minute_transfer_time() {
        assert_eq!(transfer_time_minutes("NOPE"), 10.0);
    }

    #[test]
    fn every_exchange_has_a_withdrawal_fee_for_btc() {
        for exchange in EXCHANGES {
            assert!(withdrawal_fee(exchange.id, "BTC").is_some());
        }
    }
}
