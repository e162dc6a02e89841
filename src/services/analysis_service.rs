use std::sync::Arc;

use tracing::{error, info};

use crate::models::{AnalysisResult, AnalysisState};
use crate::services::llm_service::{GenerationRequest, LlmProvider};

pub const MISSING_KEY_MESSAGE: &str =
    "API Key is missing. Please configure your environment variables.";
pub const EMPTY_ANALYSIS_MESSAGE: &str = "No analysis available.";
pub const FAILED_ANALYSIS_MESSAGE: &str = "Failed to fetch market analysis. Please try again later.";

/// How a finished analysis request turned out.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Succeeded(AnalysisResult),
    Failed(String),
}

impl AnalysisOutcome {
    pub fn into_state(self, symbol: &str) -> AnalysisState {
        match self {
            AnalysisOutcome::Succeeded(result) => AnalysisState::Succeeded {
                symbol: symbol.to_string(),
                text: result.text,
                sources: result.sources,
            },
            AnalysisOutcome::Failed(message) => AnalysisState::Failed {
                symbol: symbol.to_string(),
                message,
            },
        }
    }
}

/// Market commentary for one ticker, fetched from the LLM provider.
///
/// Never returns an error: a missing key, a transport failure and an empty
/// answer each map to a renderable outcome.
pub struct AnalysisService {
    provider: Option<Arc<dyn LlmProvider>>,
}

impl AnalysisService {
    pub fn new(provider: Option<Arc<dyn LlmProvider>>) -> Self {
        Self { provider }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn request(&self, symbol: &str) -> AnalysisOutcome {
        let Some(provider) = self.provider.as_ref() else {
            info!("Skipping analysis for {}: no API key configured", symbol);
            return AnalysisOutcome::Succeeded(AnalysisResult {
                text: MISSING_KEY_MESSAGE.to_string(),
                sources: Vec::new(),
            });
        };

        let request = GenerationRequest {
            prompt: build_analysis_prompt(symbol),
            web_grounding: true,
        };

        match provider.generate(request).await {
            Ok(generation) => {
                let text = if generation.text.is_empty() {
                    EMPTY_ANALYSIS_MESSAGE.to_string()
                } else {
                    generation.text
                };
                AnalysisOutcome::Succeeded(AnalysisResult {
                    text,
                    sources: generation.sources,
                })
            }
            Err(e) => {
                error!("Market analysis for {} failed: {}", symbol, e);
                AnalysisOutcome::Failed(FAILED_ANALYSIS_MESSAGE.to_string())
            }
        }
    }
}

fn build_analysis_prompt(symbol: &str) -> String {
    format!(
        "Give me a concise, real-time market analysis for {symbol}.\n\
         Include the current price if available, recent news, and a brief outlook (Bullish/Bearish).\n\
         Keep it under 150 words. Focus on why it is moving today."
    )
}
