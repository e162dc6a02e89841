pub mod analysis_service;
pub mod chart_service;
pub mod dashboard_service;
pub mod llm_service;
pub mod scheduler_service;
pub mod watchlist_service;
