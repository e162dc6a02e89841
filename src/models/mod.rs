mod dashboard;
mod llm;
mod price_point;
mod watchlist;

pub use dashboard::{DashboardSnapshot, MarketStats, SourceLink};
pub use llm::{AnalysisResult, AnalysisState, GroundingSource};
pub use price_point::{round_cents, ChartSeries, ChartView, PricePoint, SERIES_LEN};
pub use watchlist::{SearchTickerRequest, Ticker};
