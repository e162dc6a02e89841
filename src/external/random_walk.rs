use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::external::price_provider::PriceProvider;

const PLACEHOLDER_MIN: f64 = 150.0;
const PLACEHOLDER_SPAN: f64 = 100.0;

/// Uniform random walk: each step is `uniform(-0.5, 0.5) * volatility`.
pub struct RandomWalkProvider {
    rng: Mutex<StdRng>,
}

impl RandomWalkProvider {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Reproducible walk, used by tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomWalkProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceProvider for RandomWalkProvider {
    fn next_price(&self, previous: f64, volatility: f64) -> f64 {
        let unit: f64 = self.rng.lock().random();
        previous + (unit - 0.5) * volatility
    }

    fn should_move(&self, probability: f64) -> bool {
        // same draw the dashboard always used: move when u > 1 - p
        let unit: f64 = self.rng.lock().random();
        unit > 1.0 - probability
    }

    fn placeholder_price(&self) -> f64 {
        let unit: f64 = self.rng.lock().random();
        PLACEHOLDER_MIN + unit * PLACEHOLDER_SPAN
    }
}
