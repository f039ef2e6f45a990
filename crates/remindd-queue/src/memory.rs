//! In-memory queue implementation.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use remindd_config::QueueSettings;

use crate::error::QueueError;
use crate::queue::{Lease, WorkQueue};

/// Heap entry ordered by visibility time, then insertion order.
#[derive(Debug, Clone, Copy)]
struct DueEntry {
    not_before: DateTime<Utc>,
    seq: u64,
    job_id: Uuid,
}

impl PartialEq for DueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for DueEntry {}

impl PartialOrd for DueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the BinaryHeap pops the earliest entry first.
        other
            .not_before
            .cmp(&self.not_before)
            .then(other.seq.cmp(&self.seq))
    }
}

#[derive(Debug)]
struct Inner {
    heap: BinaryHeap<DueEntry>,
    leases: HashMap<Uuid, Lease>,
    seq: u64,
}

/// In-memory work queue with visibility-timeout leases.
///
/// Not durable on its own; the scheduler rebuilds it from the store's
/// pending jobs at startup.
pub struct MemoryQueue {
    settings: QueueSettings,
    inner: Mutex<Inner>,
}

impl MemoryQueue {
    /// Create an empty queue.
    pub fn new(settings: QueueSettings) -> Self {
        Self {
            settings,
            inner: Mutex::new(Inner {
                heap: BinaryHeap::new(),
                leases: HashMap::new(),
                seq: 0,
            }),
        }
    }

    /// Move expired leases back onto the heap.
    fn reclaim_expired(inner: &mut Inner, now: DateTime<Utc>) {
        let expired: Vec<Uuid> = inner
            .leases
            .iter()
            .filter(|(_, lease)| lease.leased_until <= now)
            .map(|(id, _)| *id)
            .collect();

        for job_id in expired {
            if let Some(lease) = inner.leases.remove(&job_id) {
                warn!("Lease expired for job {}, redelivering", job_id);
                inner.seq += 1;
                inner.heap.push(DueEntry {
                    not_before: lease.not_before,
                    seq: inner.seq,
                    job_id,
                });
            }
        }
    }
}

#[async_trait]
impl WorkQueue for MemoryQueue {
    async fn enqueue(&self, job_id: Uuid, not_before: DateTime<Utc>) -> Result<(), QueueError> {
        let mut inner = self.inner.lock().await;

        if self.settings.max_depth > 0
            && inner.heap.len() + inner.leases.len() >= self.settings.max_depth
        {
            return Err(QueueError::Full);
        }

        inner.seq += 1;
        let seq = inner.seq;
        debug!("Enqueueing job {} (visible at {})", job_id, not_before);
        inner.heap.push(DueEntry {
            not_before,
            seq,
            job_id,
        });
        Ok(())
    }

    async fn dequeue_due(&self, now: DateTime<Utc>, max: usize) -> Result<Vec<Lease>, QueueError> {
        let mut inner = self.inner.lock().await;
        Self::reclaim_expired(&mut inner, now);

        let visibility =
            chrono::Duration::seconds(self.settings.visibility_timeout_secs as i64);
        let mut leased = Vec::new();

        while leased.len() < max {
            let Some(entry) = inner.heap.peek().copied() else {
                break;
            };
            if entry.not_before > now {
                break;
            }
            inner.heap.pop();

            let lease = Lease {
                job_id: entry.job_id,
                not_before: entry.not_before,
                leased_until: now + visibility,
            };
            inner.leases.insert(entry.job_id, lease);
            leased.push(lease);
        }

        if !leased.is_empty() {
            debug!("Leased {} due job(s)", leased.len());
        }
        Ok(leased)
    }

    async fn ack(&self, job_id: Uuid) -> Result<(), QueueError> {
        let mut inner = self.inner.lock().await;
        if inner.leases.remove(&job_id).is_none() {
            // Idempotent: an ack after lease expiry is not an error.
            debug!("Ack for job {} without an active lease", job_id);
        }
        Ok(())
    }

    async fn nack(&self, job_id: Uuid, retry_delay: Duration) -> Result<(), QueueError> {
        let mut inner = self.inner.lock().await;
        if inner.leases.remove(&job_id).is_none() {
            debug!("Nack for job {} without an active lease", job_id);
            return Ok(());
        }

        let not_before = Utc::now()
            + chrono::Duration::from_std(retry_delay)
                .unwrap_or_else(|_| chrono::Duration::seconds(0));
        inner.seq += 1;
        let seq = inner.seq;
        debug!("Requeueing job {} (visible at {})", job_id, not_before);
        inner.heap.push(DueEntry {
            not_before,
            seq,
            job_id,
        });
        Ok(())
    }

    async fn contains(&self, job_id: Uuid) -> bool {
        let inner = self.inner.lock().await;
        inner.leases.contains_key(&job_id) || inner.heap.iter().any(|e| e.job_id == job_id)
    }

    async fn depth(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.heap.len() + inner.leases.len()
    }

    async fn ping(&self) -> Result<(), QueueError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
