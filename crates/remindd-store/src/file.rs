//! JSON-document file store.
//!
//! One document per record, organized by collection:
//!
//! ```text
//! {data_dir}/
//! ├── charges/
//! │   └── {uuid}.json
//! ├── participants/
//! │   └── {uuid}.json
//! ├── jobs/
//! │   ├── pending/
//! │   │   └── {uuid}.json
//! │   ├── sent/
//! │   ├── failed/
//! │   └── canceled/
//! └── attempts/
//!     └── {job uuid}/
//!         └── {uuid}.json
//! ```
//!
//! Jobs move between state directories as they transition, so scanning
//! `jobs/pending` is the hot path and history stays cheap to skip. A single
//! internal mutex serializes compound operations; that is what upholds the
//! unique-pending constraint and the compare-and-set update.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use remindd_model::{
    ChannelKind, DeliveryAttempt, JobState, Participant, RecurringCharge, ReminderJob,
};

use crate::error::StoreError;
use crate::traits::{AttemptStore, ChargeStore, JobStore, ParticipantStore, Store};

const JOB_STATES: [JobState; 4] = [
    JobState::Pending,
    JobState::Sent,
    JobState::Failed,
    JobState::Canceled,
];

/// File system based document store.
pub struct FileStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();

        for dir in ["charges", "participants", "attempts"] {
            fs::create_dir_all(root.join(dir)).await.map_err(|e| {
                StoreError::Storage(format!("Failed to create {} directory: {}", dir, e))
            })?;
        }
        for state in JOB_STATES {
            let dir = root.join("jobs").join(state.to_string());
            fs::create_dir_all(&dir).await.map_err(|e| {
                StoreError::Storage(format!("Failed to create jobs/{} directory: {}", state, e))
            })?;
        }

        debug!("FileStore initialized at {:?}", root);
        Ok(Self {
            root,
            lock: Mutex::new(()),
        })
    }

    fn charge_path(&self, id: Uuid) -> PathBuf {
        self.root.join("charges").join(format!("{}.json", id))
    }

    fn participant_path(&self, id: Uuid) -> PathBuf {
        self.root.join("participants").join(format!("{}.json", id))
    }

    fn job_path(&self, id: Uuid, state: JobState) -> PathBuf {
        self.root
            .join("jobs")
            .join(state.to_string())
            .join(format!("{}.json", id))
    }

    fn attempts_dir(&self, job_id: Uuid) -> PathBuf {
        self.root.join("attempts").join(job_id.to_string())
    }

    /// Find the state directory currently holding a job file.
    async fn find_job_file(&self, id: Uuid) -> Option<(PathBuf, JobState)> {
        for state in JOB_STATES {
            let path = self.job_path(id, state);
            if fs::try_exists(&path).await.unwrap_or(false) {
                return Some((path, state));
            }
        }
        None
    }

    async fn write_doc<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(value)
            .map_err(|e| StoreError::Storage(format!("Failed to serialize document: {}", e)))?;
        fs::write(path, content)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to write {:?}: {}", path, e)))
    }

    async fn read_doc<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to read {:?}: {}", path, e)))?;
        serde_json::from_str(&content)
            .map_err(|e| StoreError::Storage(format!("Failed to deserialize {:?}: {}", path, e)))
    }

    /// Read every parseable document in a directory. Unreadable entries are
    /// logged and skipped so one corrupt file cannot wedge the service.
    async fn scan_dir<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>, StoreError> {
        if !fs::try_exists(dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut docs = Vec::new();
        let mut entries = fs::read_dir(dir)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to read {:?}: {}", dir, e)))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to read directory entry: {}", e)))?
        {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            match Self::read_doc::<T>(&path).await {
                Ok(doc) => docs.push(doc),
                Err(e) => warn!("Skipping unreadable document {:?}: {}", path, e),
            }
        }

        Ok(docs)
    }

    /// Write a job into its state directory and drop any file it left
    /// behind in another state directory.
    async fn write_job(&self, job: &ReminderJob) -> Result<(), StoreError> {
        if let Some((old_path, old_state)) = self.find_job_file(job.id).await {
            if old_state != job.state {
                fs::remove_file(&old_path).await.ok();
            }
        }
        Self::write_doc(&self.job_path(job.id, job.state), job).await
    }
}

#[async_trait]
impl ChargeStore for FileStore {
    async fn put_charge(&self, charge: &RecurringCharge) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        Self::write_doc(&self.charge_path(charge.id), charge).await
    }

    async fn get_charge(&self, id: Uuid) -> Result<Option<RecurringCharge>, StoreError> {
        let path = self.charge_path(id);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }
        Self::read_doc(&path).await.map(Some)
    }

    async fn list_charges(&self) -> Result<Vec<RecurringCharge>, StoreError> {
        let mut charges: Vec<RecurringCharge> = Self::scan_dir(&self.root.join("charges")).await?;
        charges.sort_by_key(|c| c.created_at);
        Ok(charges)
    }

    async fn advance_cycle(
        &self,
        id: Uuid,
        to_cycle: u32,
    ) -> Result<RecurringCharge, StoreError> {
        let _guard = self.lock.lock().await;
        let path = self.charge_path(id);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StoreError::NotFound(format!("charge {}", id)));
        }
        let mut charge: RecurringCharge = Self::read_doc(&path).await?;
        if charge.cycle < to_cycle {
            while charge.cycle < to_cycle {
                charge.advance_cycle();
            }
            Self::write_doc(&path, &charge).await?;
        }
        Ok(charge)
    }
}

#[async_trait]
impl ParticipantStore for FileStore {
    async fn put_participant(&self, participant: &Participant) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        Self::write_doc(&self.participant_path(participant.id), participant).await
    }

    async fn get_participant(&self, id: Uuid) -> Result<Option<Participant>, StoreError> {
        let path = self.participant_path(id);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }
        Self::read_doc(&path).await.map(Some)
    }

    async fn list_participants(&self, charge_id: Uuid) -> Result<Vec<Participant>, StoreError> {
        let mut participants: Vec<Participant> =
            Self::scan_dir(&self.root.join("participants")).await?;
        participants.retain(|p| p.charge_id == charge_id);
        participants.sort_by_key(|p| p.created_at);
        Ok(participants)
    }

    async fn invalidate_contact(&self, id: Uuid, channel: ChannelKind) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let path = self.participant_path(id);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StoreError::NotFound(format!("participant {}", id)));
        }
        let mut participant: Participant = Self::read_doc(&path).await?;
        let contact = match channel {
            ChannelKind::Sms => participant.phone.as_mut(),
            ChannelKind::Email => participant.email.as_mut(),
        };
        if let Some(contact) = contact {
            contact.valid = false;
        }
        Self::write_doc(&path, &participant).await
    }
}

#[async_trait]
impl JobStore for FileStore {
    async fn insert_pending(&self, job: &ReminderJob) -> Result<(), StoreError> {
        if !job.is_pending() {
            return Err(StoreError::Conflict(format!(
                "job {} inserted in state {}",
                job.id, job.state
            )));
        }

        let _guard = self.lock.lock().await;
        let pending: Vec<ReminderJob> =
            Self::scan_dir(&self.root.join("jobs").join("pending")).await?;
        let duplicate = pending.iter().any(|j| {
            j.charge_id == job.charge_id
                && j.participant_id == job.participant_id
                && j.cycle == job.cycle
        });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "pending job exists for charge {} participant {} cycle {}",
                job.charge_id, job.participant_id, job.cycle
            )));
        }
        self.write_job(job).await
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<ReminderJob>, StoreError> {
        let Some((path, _)) = self.find_job_file(id).await else {
            return Ok(None);
        };
        Self::read_doc(&path).await.map(Some)
    }

    async fn update_job_if(
        &self,
        job: &ReminderJob,
        expected: JobState,
    ) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let Some((_, current_state)) = self.find_job_file(job.id).await else {
            return Err(StoreError::NotFound(format!("job {}", job.id)));
        };
        if current_state != expected {
            return Ok(false);
        }
        self.write_job(job).await?;
        Ok(true)
    }

    async fn list_jobs(&self, state: Option<JobState>) -> Result<Vec<ReminderJob>, StoreError> {
        let states: Vec<JobState> = match state {
            Some(s) => vec![s],
            None => JOB_STATES.to_vec(),
        };

        let mut jobs = Vec::new();
        for state in states {
            let dir = self.root.join("jobs").join(state.to_string());
            jobs.extend(Self::scan_dir::<ReminderJob>(&dir).await?);
        }
        jobs.sort_by_key(|j| j.scheduled_at);
        Ok(jobs)
    }

    async fn pending_for_charge(&self, charge_id: Uuid) -> Result<Vec<ReminderJob>, StoreError> {
        let mut pending: Vec<ReminderJob> =
            Self::scan_dir(&self.root.join("jobs").join("pending")).await?;
        pending.retain(|j| j.charge_id == charge_id);
        pending.sort_by_key(|j| j.scheduled_at);
        Ok(pending)
    }

    async fn cancel_pending(&self, charge_id: Uuid) -> Result<Vec<ReminderJob>, StoreError> {
        let _guard = self.lock.lock().await;
        let pending: Vec<ReminderJob> =
            Self::scan_dir(&self.root.join("jobs").join("pending")).await?;

        let mut canceled = Vec::new();
        for mut job in pending {
            if job.charge_id != charge_id {
                continue;
            }
            job.mark_canceled();
            self.write_job(&job).await?;
            canceled.push(job);
        }
        Ok(canceled)
    }
}

#[async_trait]
impl AttemptStore for FileStore {
    async fn append_attempt(&self, attempt: &DeliveryAttempt) -> Result<(), StoreError> {
        let dir = self.attempts_dir(attempt.job_id);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to create {:?}: {}", dir, e)))?;
        Self::write_doc(&dir.join(format!("{}.json", attempt.id)), attempt).await
    }

    async fn attempts_for_job(&self, job_id: Uuid) -> Result<Vec<DeliveryAttempt>, StoreError> {
        let mut attempts: Vec<DeliveryAttempt> =
            Self::scan_dir(&self.attempts_dir(job_id)).await?;
        attempts.sort_by_key(|a| a.attempt);
        Ok(attempts)
    }
}

#[async_trait]
impl Store for FileStore {
    async fn ping(&self) -> Result<(), StoreError> {
        fs::try_exists(&self.root)
            .await
            .map_err(|e| StoreError::Unavailable(format!("data directory: {}", e)))
            .and_then(|exists| {
                if exists {
                    Ok(())
                } else {
                    Err(StoreError::Unavailable(format!(
                        "data directory missing: {:?}",
                        self.root
                    )))
                }
            })
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
