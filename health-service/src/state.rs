//! Application state for the health service.

use std::sync::Arc;

use common::config::AppConfig;

use crate::service::HealthService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub health_service: Arc<HealthService>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: AppConfig) -> Self {
        Self {
            health_service: Arc::new(HealthService::new(config.connect_timeout())),
        }
    }
}
