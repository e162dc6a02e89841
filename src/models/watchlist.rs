use serde::{Deserialize, Serialize};

// ==============================================================================
// Ticker Models
// ==============================================================================

/// A watchlist entry and its latest simulated figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    /// Reference price the session change is measured against.
    pub open_price: f64,
    pub change: f64,
    pub change_percent: f64,
}

impl Ticker {
    /// Builds a ticker from a quoted price and its change since the open.
    pub fn quoted(symbol: &str, name: &str, price: f64, change: f64, change_percent: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            price,
            open_price: price - change,
            change,
            change_percent,
        }
    }

    /// A freshly discovered ticker that has not moved yet.
    pub fn unmoved(symbol: &str, name: &str, price: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            price,
            open_price: price,
            change: 0.0,
            change_percent: 0.0,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.change >= 0.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTickerRequest {
    pub query: String,
}
