use serde::{Deserialize, Serialize};

/// A web source the generated commentary was grounded on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: Option<String>,
    pub title: Option<String>,
}

impl GroundingSource {
    /// Label to show for a linkable source: its title, else the host of its URI.
    /// Sources without a URI are not linkable and yield `None`.
    pub fn display_label(&self) -> Option<String> {
        let uri = self.uri.as_deref().filter(|u| !u.is_empty())?;
        if let Some(title) = self.title.as_deref().filter(|t| !t.trim().is_empty()) {
            return Some(title.to_string());
        }
        url::Url::parse(uri)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .or_else(|| Some(uri.to_string()))
    }
}

/// Commentary text plus the sources backing it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub text: String,
    pub sources: Vec<GroundingSource>,
}

/// Observable state of the analysis panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisState {
    Idle,
    Loading {
        symbol: String,
    },
    Succeeded {
        symbol: String,
        text: String,
        sources: Vec<GroundingSource>,
    },
    Failed {
        symbol: String,
        message: String,
    },
}

impl AnalysisState {
    pub fn is_loading(&self) -> bool {
        matches!(self, AnalysisState::Loading { .. })
    }

    /// The result to render, if any. A failure renders as its message with no sources.
    pub fn result(&self) -> Option<AnalysisResult> {
        match self {
            AnalysisState::Succeeded { text, sources, .. } => Some(AnalysisResult {
                text: text.clone(),
                sources: sources.clone(),
            }),
            AnalysisState::Failed { message, .. } => Some(AnalysisResult {
                text: message.clone(),
                sources: Vec::new(),
            }),
            AnalysisState::Idle | AnalysisState::Loading { .. } => None,
        }
    }
}
