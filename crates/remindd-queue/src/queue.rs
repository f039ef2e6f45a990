//! Work queue trait and lease type.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

use crate::error::QueueError;

/// A leased job handed to one consumer.
///
/// The job stays invisible to other consumers until `leased_until`; a
/// consumer that neither acks nor nacks by then loses the lease and the job
/// is redelivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lease {
    /// The job the lease covers.
    pub job_id: Uuid,
    /// When the job became due.
    pub not_before: DateTime<Utc>,
    /// Lease expiry.
    pub leased_until: DateTime<Utc>,
}

/// Work queue contract.
///
/// Guarantees at-least-once delivery of due jobs and non-decreasing
/// `not_before` order within one consumer's batch. No strict global order
/// is promised across concurrent consumers.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Add a job, visible once `not_before` passes.
    async fn enqueue(&self, job_id: Uuid, not_before: DateTime<Utc>) -> Result<(), QueueError>;

    /// Lease up to `max` due jobs.
    async fn dequeue_due(&self, now: DateTime<Utc>, max: usize) -> Result<Vec<Lease>, QueueError>;

    /// Drop a leased job for good (delivered, failed, or canceled).
    async fn ack(&self, job_id: Uuid) -> Result<(), QueueError>;

    /// Return a leased job to the queue, visible again after `retry_delay`.
    async fn nack(&self, job_id: Uuid, retry_delay: Duration) -> Result<(), QueueError>;

    /// Whether the job is queued or leased.
    async fn contains(&self, job_id: Uuid) -> bool;

    /// Number of queued plus leased jobs.
    async fn depth(&self) -> usize;

    /// Cheap connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<(), QueueError>;
}
