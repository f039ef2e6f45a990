//! Dispatcher errors.

use thiserror::Error;

use remindd_queue::QueueError;
use remindd_scheduler::SchedulerError;
use remindd_store::StoreError;

/// Dispatcher error types.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Queue error.
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    /// Scheduler error while computing the follow-up cycle.
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
}
