use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{SearchTickerRequest, Ticker};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_watchlist))
        .route("/search", post(search_ticker))
        .route("/:symbol/select", post(select_ticker))
}

/// GET /api/watchlist
pub async fn list_watchlist(State(state): State<AppState>) -> Json<Vec<Ticker>> {
    info!("GET /api/watchlist");
    Json(state.dashboard.watchlist())
}

/// POST /api/watchlist/search
/// Selects the searched symbol, adding a placeholder entry when it is unknown
#[axum::debug_handler]
pub async fn search_ticker(
    State(state): State<AppState>,
    Json(data): Json<SearchTickerRequest>,
) -> Result<Json<Ticker>, AppError> {
    info!("POST /api/watchlist/search - query: {:?}", data.query);

    let ticker = state.dashboard.search(&data.query).map_err(|e| {
        warn!("Rejected search {:?}: {}", data.query, e);
        e
    })?;

    Ok(Json(ticker))
}

/// POST /api/watchlist/:symbol/select
#[axum::debug_handler]
pub async fn select_ticker(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Ticker>, AppError> {
    info!("POST /api/watchlist/{}/select", symbol);

    let ticker = state.dashboard.select(&symbol).map_err(|e| {
        warn!("Failed to select {}: {}", symbol, e);
        e
    })?;

    Ok(Json(ticker))
}
