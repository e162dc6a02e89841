use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/details", get(health_details))
}

async fn health() -> &'static str {
    info!("GET /health - Health check");
    "OK"
}

#[derive(Debug, Serialize)]
pub struct HealthDetails {
    pub status: &'static str,
    pub analysis_enabled: bool,
    pub watchlist_size: usize,
    pub selected: String,
}

async fn health_details(State(state): State<AppState>) -> Json<HealthDetails> {
    info!("GET /health/details");
    Json(HealthDetails {
        status: "OK",
        analysis_enabled: state.dashboard.analysis_enabled(),
        watchlist_size: state.dashboard.watchlist().len(),
        selected: state.dashboard.selected().symbol,
    })
}
