use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use marketpulse_backend::app;
use marketpulse_backend::config::AppConfig;
use marketpulse_backend::external::random_walk::RandomWalkProvider;
use marketpulse_backend::logging::{self, LoggingConfig};
use marketpulse_backend::services::analysis_service::AnalysisService;
use marketpulse_backend::services::dashboard_service::DashboardService;
use marketpulse_backend::services::llm_service;
use marketpulse_backend::services::scheduler_service::SimulationScheduler;
use marketpulse_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    logging::init_logging(LoggingConfig::from_env())?;

    let config = AppConfig::from_env()?;

    let provider = llm_service::provider_from_config(&config.llm)?;
    let analysis = Arc::new(AnalysisService::new(provider));
    let dashboard = Arc::new(DashboardService::new(
        Arc::new(RandomWalkProvider::new()),
        analysis,
        config.simulation.clone(),
    ));

    // Commentary for the initially selected ticker
    dashboard.begin_analysis();

    let mut scheduler = SimulationScheduler::new(dashboard.clone()).await?;
    scheduler.start().await?;

    let app = app::create_app(AppState { dashboard });

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("🚀 MarketPulse backend running at http://{}/", config.bind_addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Err(e) = scheduler.stop().await {
        error!("Failed to stop simulation scheduler: {}", e);
    }

    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
