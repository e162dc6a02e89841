use std::sync::Arc;

use crate::services::dashboard_service::DashboardService;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<DashboardService>,
}
