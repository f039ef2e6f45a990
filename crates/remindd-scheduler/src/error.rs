//! Scheduler errors.

use thiserror::Error;
use uuid::Uuid;

use remindd_queue::QueueError;
use remindd_store::StoreError;

/// Scheduler error types.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Charge not found.
    #[error("Charge not found: {0}")]
    ChargeNotFound(Uuid),

    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Queue error.
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
}
