//! Reminder job definition and state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// SMS gateway.
    Sms,
    /// Email gateway.
    Email,
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelKind::Sms => write!(f, "sms"),
            ChannelKind::Email => write!(f, "email"),
        }
    }
}

/// Reminder job state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// Waiting to be delivered.
    Pending,
    /// Delivered; immutable from here on.
    Sent,
    /// Delivery gave up (exhausted retries or permanent error).
    Failed,
    /// Superseded by a reconcile or charge cancellation.
    Canceled,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Pending => write!(f, "pending"),
            JobState::Sent => write!(f, "sent"),
            JobState::Failed => write!(f, "failed"),
            JobState::Canceled => write!(f, "canceled"),
        }
    }
}

impl std::str::FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobState::Pending),
            "sent" => Ok(JobState::Sent),
            "failed" => Ok(JobState::Failed),
            "canceled" => Ok(JobState::Canceled),
            other => Err(format!("unknown job state: {}", other)),
        }
    }
}

/// A scheduled reminder for one participant of one charge cycle.
///
/// At most one pending job exists per (charge, participant, cycle); the
/// store enforces that. Retries bump `attempt` and are logged as separate
/// delivery attempt records rather than rewriting history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderJob {
    /// Unique job ID.
    pub id: Uuid,
    /// Charge this reminder belongs to.
    pub charge_id: Uuid,
    /// Participant to notify.
    pub participant_id: Uuid,
    /// Charge cycle index the job belongs to.
    pub cycle: u32,
    /// When the reminder should fire.
    pub scheduled_at: DateTime<Utc>,
    /// Number of delivery attempts made so far.
    pub attempt: u32,
    /// Current state.
    pub state: JobState,
    /// Channel used by the most recent attempt.
    pub channel: Option<ChannelKind>,
    /// Error from the most recent failed attempt.
    pub last_error: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl ReminderJob {
    /// Create a new pending job.
    pub fn new(
        charge_id: Uuid,
        participant_id: Uuid,
        cycle: u32,
        scheduled_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            charge_id,
            participant_id,
            cycle,
            scheduled_at,
            attempt: 0,
            state: JobState::Pending,
            channel: None,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the job is still awaiting delivery.
    pub fn is_pending(&self) -> bool {
        self.state == JobState::Pending
    }

    /// Whether the job is due at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_pending() && self.scheduled_at <= now
    }

    /// Record a delivery attempt on the given channel.
    pub fn record_attempt(&mut self, channel: ChannelKind) {
        self.attempt += 1;
        self.channel = Some(channel);
        self.updated_at = Utc::now();
    }

    /// Mark the job delivered.
    pub fn mark_sent(&mut self) {
        self.state = JobState::Sent;
        self.last_error = None;
        self.updated_at = Utc::now();
    }

    /// Mark the job failed with the final error.
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.state = JobState::Failed;
        self.last_error = Some(error.into());
        self.updated_at = Utc::now();
    }

    /// Mark the job canceled.
    pub fn mark_canceled(&mut self) {
        self.state = JobState::Canceled;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_job_is_pending() {
        let job = ReminderJob::new(Uuid::new_v4(), Uuid::new_v4(), 0, Utc::now());
        assert!(job.is_pending());
        assert_eq!(job.attempt, 0);
        assert!(job.channel.is_none());
    }

    #[test]
    fn test_is_due() {
        let now = Utc::now();
        let due = ReminderJob::new(Uuid::new_v4(), Uuid::new_v4(), 0, now - Duration::minutes(1));
        let future = ReminderJob::new(Uuid::new_v4(), Uuid::new_v4(), 0, now + Duration::hours(1));
        assert!(due.is_due(now));
        assert!(!future.is_due(now));
    }

    #[test]
    fn test_record_attempt_and_send() {
        let mut job = ReminderJob::new(Uuid::new_v4(), Uuid::new_v4(), 3, Utc::now());
        job.record_attempt(ChannelKind::Sms);
        job.record_attempt(ChannelKind::Sms);
        job.mark_sent();

        assert_eq!(job.attempt, 2);
        assert_eq!(job.channel, Some(ChannelKind::Sms));
        assert_eq!(job.state, JobState::Sent);
        assert!(job.last_error.is_none());
    }

    #[test]
    fn test_mark_failed_keeps_error() {
        let mut job = ReminderJob::new(Uuid::new_v4(), Uuid::new_v4(), 0, Utc::now());
        job.record_attempt(ChannelKind::Email);
        job.mark_failed("mailbox does not exist");

        assert_eq!(job.state, JobState::Failed);
        assert_eq!(job.last_error.as_deref(), Some("mailbox does not exist"));
        assert!(!job.is_due(Utc::now()));
    }

    #[test]
    fn test_job_state_round_trip() {
        for state in [
            JobState::Pending,
            JobState::Sent,
            JobState::Failed,
            JobState::Canceled,
        ] {
            let parsed: JobState = state.to_string().parse().unwrap();
            assert_eq!(parsed, state);
        }
        assert!("nope".parse::<JobState>().is_err());
    }
}
