use tracing::info;

use crate::errors::AppError;
use crate::external::price_provider::PriceProvider;
use crate::models::Ticker;

pub const SEARCH_RESULT_NAME: &str = "Market Search";

/// Movement parameters of the watchlist tick.
#[derive(Debug, Clone, Copy)]
pub struct WatchlistParams {
    pub move_probability: f64,
    pub volatility: f64,
}

/// The watchlist every session starts from.
pub fn seed_watchlist() -> Vec<Ticker> {
    vec![
        Ticker::quoted("NVDA", "NVIDIA Corp", 890.50, 12.40, 1.41),
        Ticker::quoted("AAPL", "Apple Inc.", 172.75, -0.85, -0.49),
        Ticker::quoted("MSFT", "Microsoft Corp", 420.10, 2.15, 0.51),
        Ticker::quoted("GOOGL", "Alphabet Inc.", 173.90, 1.20, 0.69),
        Ticker::quoted("TSLA", "Tesla Inc.", 175.30, -3.20, -1.79),
        Ticker::quoted("AMZN", "Amazon.com", 180.20, 0.90, 0.50),
        Ticker::quoted("META", "Meta Platforms", 495.60, 5.60, 1.14),
        Ticker::quoted("AMD", "Advanced Micro", 180.10, -1.50, -0.83),
    ]
}

/// One watchlist tick. Each ticker independently moves with
/// `move_probability`; tickers that stay put come back bit-identical.
pub fn tick(tickers: &[Ticker], prices: &dyn PriceProvider, params: WatchlistParams) -> Vec<Ticker> {
    tickers
        .iter()
        .map(|ticker| {
            if prices.should_move(params.move_probability) {
                perturb(ticker, prices, params.volatility)
            } else {
                ticker.clone()
            }
        })
        .collect()
}

fn perturb(ticker: &Ticker, prices: &dyn PriceProvider, volatility: f64) -> Ticker {
    let new_price = prices.next_price(ticker.price, ticker.price * volatility);
    let delta = new_price - ticker.price;
    let change = ticker.change + delta;
    let change_percent = if ticker.open_price != 0.0 {
        change / ticker.open_price * 100.0
    } else {
        0.0
    };

    Ticker {
        price: new_price,
        change,
        change_percent,
        ..ticker.clone()
    }
}

/// Normalizes free-text search input into a symbol.
pub fn normalize_symbol(query: &str) -> Result<String, AppError> {
    let symbol = query.trim().to_uppercase();
    if symbol.is_empty() {
        return Err("Search query cannot be empty".to_string().into());
    }
    Ok(symbol)
}

pub fn find<'a>(tickers: &'a [Ticker], symbol: &str) -> Option<&'a Ticker> {
    tickers.iter().find(|t| t.symbol == symbol)
}

/// Looks `symbol` up, inserting a placeholder entry at the front when it is
/// unknown. Returns the entry and whether it was inserted.
pub fn find_or_insert(
    tickers: &mut Vec<Ticker>,
    symbol: &str,
    prices: &dyn PriceProvider,
) -> (Ticker, bool) {
    if let Some(existing) = find(tickers, symbol) {
        return (existing.clone(), false);
    }

    let ticker = Ticker::unmoved(symbol, SEARCH_RESULT_NAME, prices.placeholder_price());
    info!("Adding {} to the watchlist at {:.2}", symbol, ticker.price);
    tickers.insert(0, ticker.clone());
    (ticker, true)
}
