//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::scheduler::ScheduleGenerator;
use crate::services::lifecycle::SessionLifecycle;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for storage operations
    pub repository: Arc<dyn FullRepository>,
    /// Session mutation orchestrator
    pub lifecycle: Arc<SessionLifecycle>,
    /// Batch schedule generator
    pub generator: Arc<ScheduleGenerator>,
}

impl AppState {
    /// Create application state around the given repository.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        let lifecycle = Arc::new(SessionLifecycle::new(Arc::clone(&repository)));
        let generator = Arc::new(ScheduleGenerator::new(Arc::clone(&lifecycle)));
        Self {
            repository,
            lifecycle,
            generator,
        }
    }
}
