use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

use crate::external::price_provider::PriceProvider;
use crate::models::{ChartSeries, PricePoint, SERIES_LEN};

/// Backfills a full series for `symbol` ending one minute before `now`.
///
/// The walk starts at `base_price` and every minute steps by up to
/// `base_price * volatility / 2`. Only the stored prices are rounded.
pub fn seed(
    symbol: &str,
    base_price: f64,
    now: DateTime<Utc>,
    prices: &dyn PriceProvider,
    volatility: f64,
) -> ChartSeries {
    let step_volatility = base_price * volatility;
    let mut current = base_price;
    let mut points = VecDeque::with_capacity(SERIES_LEN);

    for minutes_back in (1..=SERIES_LEN as i64).rev() {
        current = prices.next_price(current, step_volatility);
        points.push_back(PricePoint::backfilled(now - Duration::minutes(minutes_back), current));
    }

    ChartSeries {
        symbol: symbol.to_string(),
        points,
    }
}

/// Appends one live point derived from the series' own last price and drops
/// the oldest. An empty series is returned unchanged.
pub fn advance(
    series: &ChartSeries,
    now: DateTime<Utc>,
    prices: &dyn PriceProvider,
    volatility: f64,
) -> ChartSeries {
    let Some(last) = series.last_price() else {
        return series.clone();
    };

    let mut next = series.clone();
    let price = prices.next_price(last, last * volatility);
    next.points.push_back(PricePoint::live(now, price));
    while next.points.len() > SERIES_LEN {
        next.points.pop_front();
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::random_walk::RandomWalkProvider;

    const SEED_VOL: f64 = 0.002;
    const LIVE_VOL: f64 = 0.0005;

    #[test]
    fn test_seed_has_fixed_length_and_ordered_instants() {
        let provider = RandomWalkProvider::seeded(17);
        let now = Utc::now();

        for _ in 0..2 {
            let series = seed("NVDA", 890.5, now, &provider, SEED_VOL);
            assert_eq!(series.len(), SERIES_LEN);
            assert_eq!(series.symbol, "NVDA");
            assert!(series.points.iter().zip(series.points.iter().skip(1)).all(|(a, b)| a.at < b.at));
            assert_eq!(series.points.back().unwrap().at, now - Duration::minutes(1));
            assert_eq!(series.points.front().unwrap().at, now - Duration::minutes(50));
        }
    }

    #[test]
    fn test_seed_prices_rounded_and_bounded() {
        let provider = RandomWalkProvider::seeded(3);
        let base = 172.75;
        let series = seed("AAPL", base, Utc::now(), &provider, SEED_VOL);

        let max_drift = base * SEED_VOL / 2.0 * SERIES_LEN as f64 + 0.01;
        for point in &series.points {
            assert_eq!(point.price, (point.price * 100.0).round() / 100.0);
            assert!((point.price - base).abs() <= max_drift);
        }
    }

    #[test]
    fn test_advance_replaces_oldest() {
        let provider = RandomWalkProvider::seeded(8);
        let now = Utc::now();
        let series = seed("MSFT", 420.1, now, &provider, SEED_VOL);

        let next = advance(&series, now, &provider, LIVE_VOL);
        assert_eq!(next.len(), SERIES_LEN);
        assert_eq!(next.points.front(), series.points.get(1));
        assert_eq!(
            next.points.iter().take(SERIES_LEN - 1).collect::<Vec<_>>(),
            series.points.iter().skip(1).collect::<Vec<_>>()
        );

        let last = series.last_price().unwrap();
        let added = next.points.back().unwrap();
        assert_eq!(added.at, now);
        assert!((added.price - last).abs() <= last * LIVE_VOL / 2.0 + 0.01);
    }

    #[test]
    fn test_advance_many_times_keeps_length() {
        let provider = RandomWalkProvider::seeded(21);
        let start = Utc::now();
        let mut series = seed("AMD", 180.1, start, &provider, SEED_VOL);
        for second in 0..200 {
            series = advance(&series, start + Duration::seconds(second), &provider, LIVE_VOL);
            assert_eq!(series.len(), SERIES_LEN);
        }
        assert!(series.points.iter().all(|p| p.at >= start));
    }

    #[test]
    fn test_advance_empty_is_noop() {
        let provider = RandomWalkProvider::seeded(0);
        let empty = ChartSeries::default();
        let next = advance(&empty, Utc::now(), &provider, LIVE_VOL);
        assert!(next.is_empty());
        assert_eq!(next, empty);
    }
}
