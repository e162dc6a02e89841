use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::models::DashboardSnapshot;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_dashboard))
}

/// GET /api/dashboard
/// Everything needed to render the dashboard in one response
pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    info!("GET /api/dashboard");
    Json(state.dashboard.snapshot())
}
