use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::models::ChartView;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_chart))
}

/// GET /api/chart
/// Live series of the selected ticker
pub async fn get_chart(State(state): State<AppState>) -> Json<ChartView> {
    info!("GET /api/chart");
    Json(state.dashboard.chart())
}
