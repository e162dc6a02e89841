use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::errors::AppError;
use crate::external::price_provider::PriceProvider;
use crate::models::{
    AnalysisState, ChartSeries, ChartView, DashboardSnapshot, MarketStats, SourceLink, Ticker,
};
use crate::services::analysis_service::{AnalysisOutcome, AnalysisService};
use crate::services::{chart_service, watchlist_service};

/// The single snapshot of everything on screen.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub tickers: Vec<Ticker>,
    pub selected: String,
    pub chart: ChartSeries,
    pub analysis: AnalysisState,
    /// Tag of the most recently issued analysis request.
    pub analysis_generation: u64,
}

/// Owns the dashboard state and applies every change to it: simulator ticks,
/// selection, search, and analysis completions.
pub struct DashboardService {
    state: Arc<RwLock<DashboardState>>,
    prices: Arc<dyn PriceProvider>,
    analysis: Arc<AnalysisService>,
    config: SimulationConfig,
}

impl DashboardService {
    pub fn new(
        prices: Arc<dyn PriceProvider>,
        analysis: Arc<AnalysisService>,
        config: SimulationConfig,
    ) -> Self {
        let tickers = watchlist_service::seed_watchlist();
        let first = tickers[0].clone();
        let chart = chart_service::seed(
            &first.symbol,
            first.price,
            Utc::now(),
            prices.as_ref(),
            config.seed_volatility,
        );

        let state = DashboardState {
            tickers,
            selected: first.symbol,
            chart,
            analysis: AnalysisState::Idle,
            analysis_generation: 0,
        };

        Self {
            state: Arc::new(RwLock::new(state)),
            prices,
            analysis,
            config,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn analysis_enabled(&self) -> bool {
        self.analysis.is_enabled()
    }

    pub fn watchlist(&self) -> Vec<Ticker> {
        self.state.read().tickers.clone()
    }

    pub fn selected(&self) -> Ticker {
        let state = self.state.read();
        selected_ticker(&state)
    }

    pub fn analysis(&self) -> AnalysisState {
        self.state.read().analysis.clone()
    }

    pub fn chart(&self) -> ChartView {
        let state = self.state.read();
        chart_view(&state)
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let state = self.state.read();
        let source_links = state
            .analysis
            .result()
            .map(|result| SourceLink::collect(&result.sources))
            .unwrap_or_default();

        DashboardSnapshot {
            selected: selected_ticker(&state),
            watchlist: state.tickers.clone(),
            chart: chart_view(&state),
            analysis: state.analysis.clone(),
            source_links,
            stats: MarketStats::sample(&mut rand::rng()),
        }
    }

    /// Selects a symbol already on the watchlist.
    pub fn select(&self, symbol: &str) -> Result<Ticker, AppError> {
        let symbol = watchlist_service::normalize_symbol(symbol)?;
        let ticker = {
            let mut state = self.state.write();
            let ticker = watchlist_service::find(&state.tickers, &symbol)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("{} is not on the watchlist", symbol)))?;
            self.apply_selection(&mut state, &ticker);
            ticker
        };

        self.begin_analysis();
        Ok(ticker)
    }

    /// Selects the searched symbol, adding it to the watchlist if unknown.
    pub fn search(&self, query: &str) -> Result<Ticker, AppError> {
        let symbol = watchlist_service::normalize_symbol(query)?;
        let ticker = {
            let mut state = self.state.write();
            let (ticker, inserted) =
                watchlist_service::find_or_insert(&mut state.tickers, &symbol, self.prices.as_ref());
            info!("Search for {} ({})", symbol, if inserted { "new" } else { "existing" });
            self.apply_selection(&mut state, &ticker);
            ticker
        };

        self.begin_analysis();
        Ok(ticker)
    }

    // The chart only reseeds when the symbol actually changes.
    fn apply_selection(&self, state: &mut DashboardState, ticker: &Ticker) {
        state.selected = ticker.symbol.clone();
        if state.chart.symbol != ticker.symbol {
            state.chart = chart_service::seed(
                &ticker.symbol,
                ticker.price,
                Utc::now(),
                self.prices.as_ref(),
                self.config.seed_volatility,
            );
        }
    }

    /// Starts a fresh analysis request for the selected symbol and returns the
    /// loading state it entered. The request runs on its own task.
    pub fn begin_analysis(&self) -> AnalysisState {
        let (symbol, generation, loading) = {
            let mut state = self.state.write();
            let symbol = state.selected.clone();
            state.analysis_generation += 1;
            state.analysis = AnalysisState::Loading { symbol: symbol.clone() };
            (symbol, state.analysis_generation, state.analysis.clone())
        };

        let state = Arc::clone(&self.state);
        let analysis = Arc::clone(&self.analysis);
        let discard_stale = self.config.discard_stale_analysis;

        tokio::spawn(async move {
            let outcome = analysis.request(&symbol).await;
            complete_analysis(&state, generation, &symbol, outcome, discard_stale);
        });

        loading
    }

    /// Watchlist tick; returns how many tickers moved.
    pub fn tick_watchlist(&self) -> usize {
        let params = watchlist_service::WatchlistParams {
            move_probability: self.config.move_probability,
            volatility: self.config.watchlist_volatility,
        };

        let mut state = self.state.write();
        let next = watchlist_service::tick(&state.tickers, self.prices.as_ref(), params);
        let moved = next
            .iter()
            .zip(state.tickers.iter())
            .filter(|(a, b)| a.price.to_bits() != b.price.to_bits())
            .count();
        state.tickers = next;
        moved
    }

    /// Chart tick; returns how many points were appended.
    pub fn advance_chart(&self) -> usize {
        let mut state = self.state.write();
        if state.chart.is_empty() {
            return 0;
        }
        state.chart = chart_service::advance(
            &state.chart,
            Utc::now(),
            self.prices.as_ref(),
            self.config.live_volatility,
        );
        1
    }
}

fn complete_analysis(
    state: &RwLock<DashboardState>,
    generation: u64,
    symbol: &str,
    outcome: AnalysisOutcome,
    discard_stale: bool,
) {
    let mut state = state.write();
    if discard_stale && generation != state.analysis_generation {
        debug!(
            "Discarding stale analysis for {} (request {}, latest {})",
            symbol, generation, state.analysis_generation
        );
        return;
    }
    state.analysis = outcome.into_state(symbol);
    info!("Analysis for {} applied (request {})", symbol, generation);
}

fn selected_ticker(state: &DashboardState) -> Ticker {
    watchlist_service::find(&state.tickers, &state.selected)
        .or_else(|| state.tickers.first())
        .cloned()
        .unwrap_or_else(|| Ticker::unmoved(&state.selected, watchlist_service::SEARCH_RESULT_NAME, 0.0))
}

fn chart_view(state: &DashboardState) -> ChartView {
    ChartView {
        symbol: state.chart.symbol.clone(),
        is_positive: selected_ticker(state).is_positive(),
        points: state.chart.points.iter().cloned().collect(),
    }
}
