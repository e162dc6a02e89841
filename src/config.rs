use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::services::llm_service::LlmConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Tunables of the two random-walk simulators and their tick periods.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub watchlist_tick: Duration,
    pub chart_tick: Duration,
    /// Chance that a given ticker moves on a watchlist tick.
    pub move_probability: f64,
    /// Watchlist volatility as a fraction of the current price.
    pub watchlist_volatility: f64,
    /// Volatility of the backfilled chart walk, relative to the seed price.
    pub seed_volatility: f64,
    /// Volatility of live chart points, relative to the last point.
    pub live_volatility: f64,
    pub discard_stale_analysis: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            watchlist_tick: Duration::from_millis(1500),
            chart_tick: Duration::from_millis(1000),
            move_probability: 0.4,
            watchlist_volatility: 0.0003,
            seed_volatility: 0.002,
            live_volatility: 0.0005,
            discard_stale_analysis: true,
        }
    }
}

impl SimulationConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            watchlist_tick: Duration::from_millis(env_or(
                "WATCHLIST_TICK_MS",
                defaults.watchlist_tick.as_millis() as u64,
            )),
            chart_tick: Duration::from_millis(env_or(
                "CHART_TICK_MS",
                defaults.chart_tick.as_millis() as u64,
            )),
            move_probability: env_or("WATCHLIST_MOVE_PROBABILITY", defaults.move_probability)
                .clamp(0.0, 1.0),
            watchlist_volatility: env_or("WATCHLIST_VOLATILITY", defaults.watchlist_volatility),
            discard_stale_analysis: env_or(
                "DISCARD_STALE_ANALYSIS",
                defaults.discard_stale_analysis,
            ),
            ..defaults
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub llm: LlmConfig,
    pub simulation: SimulationConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()?;

        Ok(Self {
            bind_addr,
            llm: LlmConfig::from_env(),
            simulation: SimulationConfig::from_env(),
        })
    }
}

/// Reads and parses an environment variable, falling back to `default` when
/// it is unset or unparseable.
pub(crate) fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Invalid value {:?} for {}, using default {:?}", raw, key, default);
                default
            }
        },
        Err(_) => default,
    }
}
