//! Locally generated market data used when the quote API is unavailable.
//!
//! Everything here is demo filler: the numbers only need to look plausible.

use chrono::{Duration, Utc};
use rand::Rng;

use crate::types::{IndexHistoryPoint, PriceQuote, Timeframe};

/// Reference prices for the popular stocks and the index ETFs.
const BASE_PRICES: &[(&str, f64)] = &[
    ("SPY", 500.0),
    ("QQQ", 420.0),
    ("DIA", 380.0),
    ("IWM", 200.0),
    ("AAPL", 180.0),
    ("MSFT", 420.0),
    ("GOOGL", 175.0),
    ("AMZN", 185.0),
    ("META", 500.0),
    ("TSLA", 175.0),
    ("JPM", 190.0),
    ("V", 280.0),
    ("JNJ", 145.0),
    ("PG", 160.0),
    ("NVDA", 875.0),
    ("DIS", 110.0),
    ("NFLX", 600.0),
    ("KO", 60.0),
    ("PEP", 170.0),
];

/// Daily volatility of the simulated random walk.
const HISTORY_VOLATILITY: f64 = 0.01;

/// Known reference price for a symbol.
pub fn base_price(symbol: &str) -> Option<f64> {
    BASE_PRICES
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, price)| *price)
}

/// Reference price, or a random whole-dollar price in [50, 350) for unknown symbols.
pub fn base_price_or_random<R: Rng + ?Sized>(symbol: &str, rng: &mut R) -> f64 {
    base_price(symbol).unwrap_or_else(|| rng.gen_range(50..350) as f64)
}

/// A quote within ±2% of the reference price.
pub fn simulated_quote<R: Rng + ?Sized>(symbol: &str, rng: &mut R) -> PriceQuote {
    let base = base_price_or_random(symbol, rng);
    let change_percent = rng.gen_range(-2.0..2.0);
    let change = base * (change_percent / 100.0);
    let now = Utc::now();

    PriceQuote {
        symbol: symbol.to_string(),
        price: base + change,
        change,
        change_percent,
        volume: rng.gen_range(100_000..5_100_000),
        timestamp: now.timestamp_millis(),
        last_updated: now.to_rfc3339(),
        simulated: true,
    }
}

/// Reference price jittered by up to ±3%.
pub fn jittered_price<R: Rng + ?Sized>(symbol: &str, rng: &mut R) -> f64 {
    base_price_or_random(symbol, rng) * (1.0 + rng.gen_range(-0.03..0.03))
}

/// Daily close series ending today, one point per day plus today.
///
/// Prices never drop below 70% of the starting price and are rounded to cents.
pub fn simulated_index_history<R: Rng + ?Sized>(
    symbol: &str,
    timeframe: Timeframe,
    rng: &mut R,
) -> Vec<IndexHistoryPoint> {
    let days = timeframe.simulated_days();
    let base = base_price(symbol).unwrap_or(100.0);
    let floor = base * 0.7;
    let today = Utc::now().date_naive();

    let mut price = base;
    (0..=days)
        .rev()
        .map(|days_ago| {
            price += price * HISTORY_VOLATILITY * rng.gen_range(-1.0..1.0);
            if price < floor {
                price = floor;
            }
            IndexHistoryPoint {
                date: (today - Duration::days(days_ago)).format("%Y-%m-%d").to_string(),
                value: (price * 100.0).round() / 100.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_base_price_table() {
        assert_eq!(base_price("SPY"), Some(500.0));
        assert_eq!(base_price("NVDA"), Some(875.0));
        assert_eq!(base_price("ZZZZ"), None);
    }

    #[test]
    fn test_unknown_symbol_random_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let price = base_price_or_random("ZZZZ", &mut rng);
            assert!((50.0..350.0).contains(&price));
            assert_eq!(price.fract(), 0.0);
        }
    }

    #[test]
    fn test_simulated_quote_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let quote = simulated_quote("AAPL", &mut rng);
            assert!(quote.simulated);
            assert!((-2.0..2.0).contains(&quote.change_percent));
            assert!((100_000..5_100_000).contains(&quote.volume));
            assert!((quote.price - (180.0 + quote.change)).abs() < 1e-9);
            assert!(quote.price > 176.0 && quote.price < 184.0);
        }
    }

    #[test]
    fn test_jittered_price_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let price = jittered_price("KO", &mut rng);
            assert!(price >= 60.0 * 0.97 && price < 60.0 * 1.03);
        }
    }

    #[test]
    fn test_simulated_history_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let week = simulated_index_history("DIA", Timeframe::OneWeek, &mut rng);
        assert_eq!(week.len(), 8);

        let all = simulated_index_history("IWM", Timeframe::All, &mut rng);
        assert_eq!(all.len(), 31);

        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(all.last().map(|p| p.date.clone()), Some(today));
        assert!(all.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_simulated_history_floor() {
        let mut rng = StdRng::seed_from_u64(99);
        let points = simulated_index_history("SPY", Timeframe::ThreeMonths, &mut rng);
        assert_eq!(points.len(), 91);
        assert!(points.iter().all(|p| p.value >= 350.0));
        assert!(points
            .iter()
            .all(|p| ((p.value * 100.0) - (p.value * 100.0).round()).abs() < 1e-6));
    }
}
