use std::sync::Arc;

use crate::config::Config;
use crate::service::OrganizationService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Directory engines over the connection pool
    pub service: OrganizationService,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(service: OrganizationService, config: Config) -> Self {
        Self {
            service,
            config: Arc::new(config),
        }
    }
}
