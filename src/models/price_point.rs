use std::collections::VecDeque;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Number of points kept in a chart series.
pub const SERIES_LEN: usize = 50;

// One point of the live chart for the selected ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub time: String,            // display label, local clock
    pub at: DateTime<Utc>,
    pub price: f64,              // rounded to cents
}

impl PricePoint {
    /// Backfilled points are labelled to the minute.
    pub fn backfilled(at: DateTime<Utc>, price: f64) -> Self {
        Self {
            time: at.with_timezone(&Local).format("%H:%M").to_string(),
            at,
            price: round_cents(price),
        }
    }

    /// Live points are labelled to the second.
    pub fn live(at: DateTime<Utc>, price: f64) -> Self {
        Self {
            time: at.with_timezone(&Local).format("%H:%M:%S").to_string(),
            at,
            price: round_cents(price),
        }
    }
}

/// Sliding window of chart points belonging to one symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub symbol: String,
    pub points: VecDeque<PricePoint>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_price(&self) -> Option<f64> {
        self.points.back().map(|p| p.price)
    }
}

/// What the dashboard renders for the chart panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartView {
    pub symbol: String,
    pub is_positive: bool,
    pub points: Vec<PricePoint>,
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(172.754), 172.75);
        assert_eq!(round_cents(172.756), 172.76);
        assert_eq!(round_cents(-0.004), -0.0);
    }

    #[test]
    fn test_point_labels() {
        let at = Utc::now();
        let backfilled = PricePoint::backfilled(at, 10.0);
        let live = PricePoint::live(at, 10.0);
        assert_eq!(backfilled.time.len(), 5);
        assert_eq!(live.time.len(), 8);
        assert!(live.time.starts_with(&backfilled.time));
    }

    #[test]
    fn test_empty_series_has_no_last_price() {
        let series = ChartSeries::default();
        assert!(series.is_empty());
        assert_eq!(series.last_price(), None);
    }
}
