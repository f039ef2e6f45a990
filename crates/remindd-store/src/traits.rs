//! Store traits, one per collection.

use async_trait::async_trait;
use uuid::Uuid;

use remindd_model::{
    ChannelKind, DeliveryAttempt, JobState, Participant, RecurringCharge, ReminderJob,
};

use crate::error::StoreError;

/// Charge collection.
#[async_trait]
pub trait ChargeStore: Send + Sync {
    /// Insert or replace a charge.
    async fn put_charge(&self, charge: &RecurringCharge) -> Result<(), StoreError>;

    /// Load a charge by ID.
    async fn get_charge(&self, id: Uuid) -> Result<Option<RecurringCharge>, StoreError>;

    /// Load all charges.
    async fn list_charges(&self) -> Result<Vec<RecurringCharge>, StoreError>;

    /// Advance the charge's due date one cadence period at a time until its
    /// cycle index reaches `to_cycle`. A charge already at or past the
    /// target is returned unchanged, so concurrent completions of the same
    /// cycle advance it exactly once.
    async fn advance_cycle(&self, id: Uuid, to_cycle: u32)
        -> Result<RecurringCharge, StoreError>;
}

/// Participant collection.
#[async_trait]
pub trait ParticipantStore: Send + Sync {
    /// Insert or replace a participant.
    async fn put_participant(&self, participant: &Participant) -> Result<(), StoreError>;

    /// Load a participant by ID.
    async fn get_participant(&self, id: Uuid) -> Result<Option<Participant>, StoreError>;

    /// Load all participants of a charge.
    async fn list_participants(&self, charge_id: Uuid) -> Result<Vec<Participant>, StoreError>;

    /// Mark a participant's contact for the given channel undeliverable so
    /// future scheduling skips it.
    async fn invalidate_contact(&self, id: Uuid, channel: ChannelKind) -> Result<(), StoreError>;
}

/// Reminder job collection.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a pending job. Fails with [`StoreError::Conflict`] when a
    /// pending job already exists for the same (charge, participant, cycle).
    async fn insert_pending(&self, job: &ReminderJob) -> Result<(), StoreError>;

    /// Load a job by ID.
    async fn get_job(&self, id: Uuid) -> Result<Option<ReminderJob>, StoreError>;

    /// Write `job` only when its stored state still equals `expected`.
    /// Returns `false` when another writer transitioned the job first.
    async fn update_job_if(
        &self,
        job: &ReminderJob,
        expected: JobState,
    ) -> Result<bool, StoreError>;

    /// Load jobs, optionally filtered by state.
    async fn list_jobs(&self, state: Option<JobState>) -> Result<Vec<ReminderJob>, StoreError>;

    /// Load the pending jobs of a charge.
    async fn pending_for_charge(&self, charge_id: Uuid) -> Result<Vec<ReminderJob>, StoreError>;

    /// Mark every pending job of a charge canceled in one sweep.
    /// Returns the jobs that were canceled.
    async fn cancel_pending(&self, charge_id: Uuid) -> Result<Vec<ReminderJob>, StoreError>;
}

/// Delivery attempt log. Append-only.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Append an attempt record.
    async fn append_attempt(&self, attempt: &DeliveryAttempt) -> Result<(), StoreError>;

    /// Load a job's attempts ordered by attempt number.
    async fn attempts_for_job(&self, job_id: Uuid) -> Result<Vec<DeliveryAttempt>, StoreError>;
}

/// The full store surface.
#[async_trait]
pub trait Store: ChargeStore + ParticipantStore + JobStore + AttemptStore {
    /// Cheap connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}
