use rand::Rng;
use serde::{Deserialize, Serialize};

use super::llm::{AnalysisState, GroundingSource};
use super::price_point::ChartView;
use super::watchlist::Ticker;

/// Placeholder quick stats shown beside the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStats {
    pub volume_millions: f64,
    pub market_cap_trillions: f64,
    pub pe_ratio: f64,
}

impl MarketStats {
    pub fn sample<R: Rng>(rng: &mut R) -> Self {
        Self {
            volume_millions: round_tenths(rng.random_range(10.0..60.0)),
            market_cap_trillions: round_tenths(rng.random_range(0.5..2.5)),
            pe_ratio: round_tenths(rng.random_range(15.0..55.0)),
        }
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A linkable grounding source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceLink {
    pub label: String,
    pub uri: String,
}

impl SourceLink {
    pub fn collect(sources: &[GroundingSource]) -> Vec<SourceLink> {
        sources
            .iter()
            .filter_map(|s| {
                let label = s.display_label()?;
                Some(SourceLink {
                    label,
                    uri: s.uri.clone()?,
                })
            })
            .collect()
    }
}

/// Everything the dashboard needs for one render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub selected: Ticker,
    pub watchlist: Vec<Ticker>,
    pub chart: ChartView,
    pub analysis: AnalysisState,
    pub source_links: Vec<SourceLink>,
    pub stats: MarketStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_stats_within_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let stats = MarketStats::sample(&mut rng);
            assert!((10.0..=60.0).contains(&stats.volume_millions));
            assert!((0.5..=2.5).contains(&stats.market_cap_trillions));
            assert!((15.0..=55.0).contains(&stats.pe_ratio));
        }
    }

    #[test]
    fn test_source_links_skip_unlinkable() {
        let sources = vec![
            GroundingSource { uri: None, title: Some("No link".into()) },
            GroundingSource {
                uri: Some("https://finance.yahoo.com/quote/AMD".into()),
                title: None,
            },
        ];
        let links = SourceLink::collect(&sources);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].label, "finance.yahoo.com");
    }
}
