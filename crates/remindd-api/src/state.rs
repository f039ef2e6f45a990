//! Shared application state.

use std::sync::Arc;

use remindd_queue::WorkQueue;
use remindd_scheduler::Scheduler;
use remindd_store::Store;

/// State shared by every handler.
pub struct AppState {
    /// Persistent store.
    pub store: Arc<dyn Store>,
    /// Work queue, probed by the health endpoint.
    pub queue: Arc<dyn WorkQueue>,
    /// Scheduler core, invoked by mutating charge routes.
    pub scheduler: Arc<Scheduler>,
}

impl AppState {
    /// Bundle the service components.
    pub fn new(
        store: Arc<dyn Store>,
        queue: Arc<dyn WorkQueue>,
        scheduler: Arc<Scheduler>,
    ) -> Self {
        Self {
            store,
            queue,
            scheduler,
        }
    }
}
