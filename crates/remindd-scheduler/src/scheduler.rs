//! Scheduler core implementation.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use remindd_config::SchedulerSettings;
use remindd_model::{JobState, Participant, RecurringCharge, ReminderJob};
use remindd_queue::WorkQueue;
use remindd_store::{ChargeStore, JobStore, ParticipantStore, Store, StoreError};

use crate::error::SchedulerError;

/// What a reconcile pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// New pending jobs created.
    pub created: usize,
    /// Pending jobs canceled.
    pub canceled: usize,
    /// Pending jobs re-enqueued after a lost queue entry.
    pub requeued: usize,
}

impl ReconcileOutcome {
    /// Whether the pass changed anything.
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.canceled == 0 && self.requeued == 0
    }
}

/// Scheduler core.
///
/// Stateless apart from a per-charge lock map: every decision is derived
/// from the store, so any number of reconcile calls converge on the same
/// job window.
pub struct Scheduler {
    store: Arc<dyn Store>,
    queue: Arc<dyn WorkQueue>,
    settings: SchedulerSettings,
    charge_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl Scheduler {
    /// Create a new scheduler core.
    pub fn new(
        store: Arc<dyn Store>,
        queue: Arc<dyn WorkQueue>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            store,
            queue,
            settings,
            charge_locks: DashMap::new(),
        }
    }

    fn lead_time(&self) -> Duration {
        Duration::seconds(self.settings.lead_time_hours as i64 * 3600)
    }

    fn charge_lock(&self, id: Uuid) -> Arc<Mutex<()>> {
        self.charge_locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// When a reminder for `next_due_at` should fire: lead time before the
    /// due date, clamped so a late creation fires immediately.
    pub fn fire_time(&self, next_due_at: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
        (next_due_at - self.lead_time()).max(now)
    }

    /// Create and enqueue the next reminder job for one participant of the
    /// charge's current cycle.
    ///
    /// Returns `None` when nothing was scheduled: the charge is not active,
    /// the participant has no deliverable opted-in channel, or a pending
    /// job for the (charge, participant, cycle) tuple already exists.
    pub async fn schedule_next(
        &self,
        charge: &RecurringCharge,
        participant: &Participant,
    ) -> Result<Option<ReminderJob>, SchedulerError> {
        if !charge.is_active() || participant.preferred_channel().is_none() {
            return Ok(None);
        }

        let now = Utc::now();
        let job = ReminderJob::new(
            charge.id,
            participant.id,
            charge.cycle,
            self.fire_time(charge.next_due_at, now),
        );

        match self.store.insert_pending(&job).await {
            Ok(()) => {
                self.queue.enqueue(job.id, job.scheduled_at).await?;
                debug!(
                    "Scheduled reminder {} for participant {} (charge {}, cycle {}, fires {})",
                    job.id, participant.id, charge.id, job.cycle, job.scheduled_at
                );
                Ok(Some(job))
            }
            Err(StoreError::Conflict(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Bring a charge's pending jobs in line with its current state.
    ///
    /// Serialized per charge. Cancels pending jobs that no longer match
    /// (wrong cycle, drifted fire time, participant opted out or contact
    /// invalid, charge paused/canceled), creates the missing ones, and
    /// re-enqueues pending jobs whose queue entry was lost. Calling this
    /// any number of times for the same mutation is safe: a second pass
    /// finds matching jobs and does nothing.
    pub async fn reconcile(&self, charge_id: Uuid) -> Result<ReconcileOutcome, SchedulerError> {
        let lock = self.charge_lock(charge_id);
        let _guard = lock.lock().await;

        let Some(charge) = self.store.get_charge(charge_id).await? else {
            return Err(SchedulerError::ChargeNotFound(charge_id));
        };

        let mut outcome = ReconcileOutcome::default();

        if !charge.is_active() {
            let canceled = self.store.cancel_pending(charge_id).await?;
            outcome.canceled = canceled.len();
            if outcome.canceled > 0 {
                info!(
                    "Canceled {} pending reminder(s) for {} charge {}",
                    outcome.canceled, charge.status, charge_id
                );
            }
            return Ok(outcome);
        }

        let participants = self.store.list_participants(charge_id).await?;
        let pending = self.store.pending_for_charge(charge_id).await?;
        let now = Utc::now();
        let desired = charge.next_due_at - self.lead_time();

        // Keep pending jobs that still match the charge; cancel the rest.
        // A job lagging behind the charge's cycle is late work in flight
        // (its participant has not been reminded for that cycle yet) and
        // must be left alone; only current-cycle jobs are checked for
        // schedule drift.
        let mut covered: HashSet<Uuid> = HashSet::new();
        for mut job in pending {
            let participant = participants.iter().find(|p| p.id == job.participant_id);
            let deliverable = participant.is_some_and(|p| p.preferred_channel().is_some());
            // A clamped job legitimately sits anywhere in [desired, now].
            let drifted = job.cycle == charge.cycle
                && (job.scheduled_at < desired || job.scheduled_at > desired.max(now));

            if !deliverable || job.cycle > charge.cycle || drifted {
                job.mark_canceled();
                if self.store.update_job_if(&job, JobState::Pending).await? {
                    debug!("Canceled stale reminder {} for charge {}", job.id, charge_id);
                    outcome.canceled += 1;
                }
                continue;
            }

            covered.insert(job.participant_id);
            if !self.queue.contains(job.id).await {
                self.queue
                    .enqueue(job.id, job.scheduled_at.max(now))
                    .await?;
                outcome.requeued += 1;
            }
        }

        // Create the missing one-ahead jobs.
        for participant in &participants {
            if covered.contains(&participant.id) {
                continue;
            }
            if self.schedule_next(&charge, participant).await?.is_some() {
                outcome.created += 1;
            }
        }

        if !outcome.is_noop() {
            info!(
                "Reconciled charge {}: {} created, {} canceled, {} requeued",
                charge_id, outcome.created, outcome.canceled, outcome.requeued
            );
        }
        Ok(outcome)
    }

    /// Called by the dispatcher after a job reaches a terminal delivery
    /// outcome: advance the charge to the cycle after the job's (a no-op
    /// when another participant's job already did) and schedule this
    /// participant's reminder for the new cycle.
    pub async fn complete_cycle(&self, job: &ReminderJob) -> Result<(), SchedulerError> {
        let lock = self.charge_lock(job.charge_id);
        let _guard = lock.lock().await;

        let charge = match self.store.advance_cycle(job.charge_id, job.cycle + 1).await {
            Ok(charge) => charge,
            Err(StoreError::NotFound(_)) => {
                debug!("Charge {} gone, no follow-up cycle", job.charge_id);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if !charge.is_active() {
            return Ok(());
        }
        let Some(participant) = self.store.get_participant(job.participant_id).await? else {
            return Ok(());
        };
        self.schedule_next(&charge, &participant).await?;
        Ok(())
    }

    /// One self-healing pass over every charge.
    pub async fn sweep(&self) -> Result<(), SchedulerError> {
        let charges = self.store.list_charges().await?;
        for charge in charges {
            if let Err(e) = self.reconcile(charge.id).await {
                warn!("Reconcile failed for charge {}: {}", charge.id, e);
            }
        }
        Ok(())
    }

    /// Run the periodic reconcile sweep until shutdown. The first tick
    /// fires immediately, which doubles as startup recovery: every pending
    /// job in the store is re-enqueued into a fresh queue.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Scheduler started (reconcile sweep every {}s, lead time {}h)",
            self.settings.reconcile_interval_secs, self.settings.lead_time_hours
        );

        let mut interval = tokio::time::interval(self.settings.reconcile_interval());

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.sweep().await {
                        error!("Reconcile sweep failed: {}", e);
                    }
                }
                _ = shutdown.changed() => {
                    info!("Scheduler shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
