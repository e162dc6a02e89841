use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::info;

use crate::models::AnalysisState;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_analysis))
        .route("/refresh", post(refresh_analysis))
}

/// GET /api/analysis
pub async fn get_analysis(State(state): State<AppState>) -> Json<AnalysisState> {
    info!("GET /api/analysis");
    Json(state.dashboard.analysis())
}

/// POST /api/analysis/refresh
/// Re-requests the commentary for the selected ticker; answers with the loading state
pub async fn refresh_analysis(State(state): State<AppState>) -> Json<AnalysisState> {
    info!("POST /api/analysis/refresh");
    Json(state.dashboard.begin_analysis())
}
