//! Append-only delivery attempt records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::job::ChannelKind;

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The gateway accepted the message.
    Delivered,
    /// The gateway throttled us; retried with backoff.
    RateLimited,
    /// The recipient address is not deliverable; terminal.
    InvalidRecipient,
    /// Transient gateway or transport failure; retried with backoff.
    TransientError,
    /// Non-retryable gateway failure; terminal.
    PermanentError,
    /// The send did not complete within the timeout; retried with backoff.
    TimedOut,
}

impl AttemptOutcome {
    /// Whether the attempt delivered the reminder.
    pub fn succeeded(&self) -> bool {
        matches!(self, AttemptOutcome::Delivered)
    }
}

/// One row of the delivery audit log. Never updated, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryAttempt {
    /// Unique attempt ID.
    pub id: Uuid,
    /// Job this attempt belongs to.
    pub job_id: Uuid,
    /// 1-based attempt number within the job.
    pub attempt: u32,
    /// Channel used.
    pub channel: ChannelKind,
    /// What happened.
    pub outcome: AttemptOutcome,
    /// Gateway error detail, if any.
    pub error: Option<String>,
    /// When the attempt finished.
    pub timestamp: DateTime<Utc>,
}

impl DeliveryAttempt {
    /// Record an attempt outcome.
    pub fn new(
        job_id: Uuid,
        attempt: u32,
        channel: ChannelKind,
        outcome: AttemptOutcome,
        error: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id,
            attempt,
            channel,
            outcome,
            error,
            timestamp: Utc::now(),
        }
    }
}
