//! Application state for the HTTP server.

use std::sync::Arc;

use crate::catalogue::Catalogue;
use crate::db::repository::SpawnRepository;
use crate::scraper::SpawnSource;
use crate::services::RefreshOrchestrator;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Store for observations
    pub repository: Arc<dyn SpawnRepository>,
    /// Boss metadata loaded at startup
    pub catalogue: Arc<Catalogue>,
    /// Shared with the daily scheduler task
    pub orchestrator: Arc<RefreshOrchestrator>,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn SpawnRepository>,
        catalogue: Arc<Catalogue>,
        source: Arc<dyn SpawnSource>,
    ) -> Self {
        let orchestrator = Arc::new(RefreshOrchestrator::new(repository.clone(), source));
        Self {
            repository,
            catalogue,
            orchestrator,
        }
    }
}
