/// Source of simulated price movement.
///
/// Everything random the simulators do goes through this trait, so a real
/// market feed (or a scripted one in tests) can stand in for the random walk
/// without touching the watchlist or chart code.
pub trait PriceProvider: Send + Sync {
    /// Next price after `previous`, moving by at most `volatility / 2` either way.
    fn next_price(&self, previous: f64, volatility: f64) -> f64;

    /// Whether an entry should move on this tick, true with `probability`.
    fn should_move(&self, probability: f64) -> bool;

    /// Starting price for a symbol nobody has quoted yet.
    fn placeholder_price(&self) -> f64;
}
