//! In-memory store for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use remindd_model::{
    ChannelKind, DeliveryAttempt, JobState, Participant, RecurringCharge, ReminderJob,
};

use crate::error::StoreError;
use crate::traits::{AttemptStore, ChargeStore, JobStore, ParticipantStore, Store};

/// In-memory store. Every collection lives behind its own lock; compound
/// job operations hold the jobs lock for their whole critical section, which
/// is what makes the unique-pending constraint atomic.
pub struct MemoryStore {
    charges: RwLock<HashMap<Uuid, RecurringCharge>>,
    participants: RwLock<HashMap<Uuid, Participant>>,
    jobs: RwLock<HashMap<Uuid, ReminderJob>>,
    attempts: RwLock<Vec<DeliveryAttempt>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            charges: RwLock::new(HashMap::new()),
            participants: RwLock::new(HashMap::new()),
            jobs: RwLock::new(HashMap::new()),
            attempts: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChargeStore for MemoryStore {
    async fn put_charge(&self, charge: &RecurringCharge) -> Result<(), StoreError> {
        let mut charges = self.charges.write().await;
        charges.insert(charge.id, charge.clone());
        Ok(())
    }

    async fn get_charge(&self, id: Uuid) -> Result<Option<RecurringCharge>, StoreError> {
        let charges = self.charges.read().await;
        Ok(charges.get(&id).cloned())
    }

    async fn list_charges(&self) -> Result<Vec<RecurringCharge>, StoreError> {
        let charges = self.charges.read().await;
        let mut all: Vec<_> = charges.values().cloned().collect();
        all.sort_by_key(|c| c.created_at);
        Ok(all)
    }

    async fn advance_cycle(
        &self,
        id: Uuid,
        to_cycle: u32,
    ) -> Result<RecurringCharge, StoreError> {
        let mut charges = self.charges.write().await;
        let charge = charges
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("charge {}", id)))?;
        while charge.cycle < to_cycle {
            charge.advance_cycle();
        }
        Ok(charge.clone())
    }
}

#[async_trait]
impl ParticipantStore for MemoryStore {
    async fn put_participant(&self, participant: &Participant) -> Result<(), StoreError> {
        let mut participants = self.participants.write().await;
        participants.insert(participant.id, participant.clone());
        Ok(())
    }

    async fn get_participant(&self, id: Uuid) -> Result<Option<Participant>, StoreError> {
        let participants = self.participants.read().await;
        Ok(participants.get(&id).cloned())
    }

    async fn list_participants(&self, charge_id: Uuid) -> Result<Vec<Participant>, StoreError> {
        let participants = self.participants.read().await;
        let mut matching: Vec<_> = participants
            .values()
            .filter(|p| p.charge_id == charge_id)
            .cloned()
            .collect();
        matching.sort_by_key(|p| p.created_at);
        Ok(matching)
    }

    async fn invalidate_contact(&self, id: Uuid, channel: ChannelKind) -> Result<(), StoreError> {
        let mut participants = self.participants.write().await;
        let participant = participants
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("participant {}", id)))?;
        let contact = match channel {
            ChannelKind::Sms => participant.phone.as_mut(),
            ChannelKind::Email => participant.email.as_mut(),
        };
        if let Some(contact) = contact {
            contact.valid = false;
        }
        Ok(())
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn insert_pending(&self, job: &ReminderJob) -> Result<(), StoreError> {
        if !job.is_pending() {
            return Err(StoreError::Conflict(format!(
                "job {} inserted in state {}",
                job.id, job.state
            )));
        }

        let mut jobs = self.jobs.write().await;
        let duplicate = jobs.values().any(|j| {
            j.is_pending()
                && j.charge_id == job.charge_id
                && j.participant_id == job.participant_id
                && j.cycle == job.cycle
        });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "pending job exists for charge {} participant {} cycle {}",
                job.charge_id, job.participant_id, job.cycle
            )));
        }
        jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<ReminderJob>, StoreError> {
        let jobs = self.jobs.read().await;
        Ok(jobs.get(&id).cloned())
    }

    async fn update_job_if(
        &self,
        job: &ReminderJob,
        expected: JobState,
    ) -> Result<bool, StoreError> {
        let mut jobs = self.jobs.write().await;
        let current = jobs
            .get(&job.id)
            .ok_or_else(|| StoreError::NotFound(format!("job {}", job.id)))?;
        if current.state != expected {
            return Ok(false);
        }
        jobs.insert(job.id, job.clone());
        Ok(true)
    }

    async fn list_jobs(&self, state: Option<JobState>) -> Result<Vec<ReminderJob>, StoreError> {
        let jobs = self.jobs.read().await;
        let mut matching: Vec<_> = jobs
            .values()
            .filter(|j| state.is_none_or(|s| j.state == s))
            .cloned()
            .collect();
        matching.sort_by_key(|j| j.scheduled_at);
        Ok(matching)
    }

    async fn pending_for_charge(&self, charge_id: Uuid) -> Result<Vec<ReminderJob>, StoreError> {
        let jobs = self.jobs.read().await;
        let mut matching: Vec<_> = jobs
            .values()
            .filter(|j| j.is_pending() && j.charge_id == charge_id)
            .cloned()
            .collect();
        matching.sort_by_key(|j| j.scheduled_at);
        Ok(matching)
    }

    async fn cancel_pending(&self, charge_id: Uuid) -> Result<Vec<ReminderJob>, StoreError> {
        let mut jobs = self.jobs.write().await;
        let mut canceled = Vec::new();
        for job in jobs.values_mut() {
            if job.is_pending() && job.charge_id == charge_id {
                job.mark_canceled();
                canceled.push(job.clone());
            }
        }
        Ok(canceled)
    }
}

#[async_trait]
impl AttemptStore for MemoryStore {
    async fn append_attempt(&self, attempt: &DeliveryAttempt) -> Result<(), StoreError> {
        let mut attempts = self.attempts.write().await;
        attempts.push(attempt.clone());
        Ok(())
    }

    async fn attempts_for_job(&self, job_id: Uuid) -> Result<Vec<DeliveryAttempt>, StoreError> {
        let attempts = self.attempts.read().await;
        let mut matching: Vec<_> = attempts
            .iter()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect();
        matching.sort_by_key(|a| a.attempt);
        Ok(matching)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
