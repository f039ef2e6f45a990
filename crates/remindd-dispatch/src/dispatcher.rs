//! Delivery dispatcher implementation.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Semaphore, watch};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use remindd_channels::{ReminderMessage, SendError};
use remindd_config::DispatcherSettings;
use remindd_model::{
    AttemptOutcome, ChannelKind, DeliveryAttempt, JobState, Participant, ReminderJob,
    effective_shares,
};
use remindd_queue::WorkQueue;
use remindd_scheduler::Scheduler;
use remindd_store::{AttemptStore, ChargeStore, JobStore, ParticipantStore, Store};

use crate::backoff::{backoff_delay, degraded_pause};
use crate::channel_set::ChannelSet;
use crate::error::DispatchError;

/// Delivery dispatcher.
///
/// Stateless between polls: every decision re-reads the job and charge
/// from the store, so any number of dispatcher instances can share one
/// queue and coordinate purely through leases.
pub struct Dispatcher {
    store: Arc<dyn Store>,
    queue: Arc<dyn WorkQueue>,
    scheduler: Arc<Scheduler>,
    channels: ChannelSet,
    settings: DispatcherSettings,
    in_flight: Arc<Semaphore>,
}

impl Dispatcher {
    /// Create a new dispatcher.
    pub fn new(
        store: Arc<dyn Store>,
        queue: Arc<dyn WorkQueue>,
        scheduler: Arc<Scheduler>,
        channels: ChannelSet,
        settings: DispatcherSettings,
    ) -> Self {
        let permits = settings.max_in_flight.max(1);
        Self {
            store,
            queue,
            scheduler,
            channels,
            settings,
            in_flight: Arc::new(Semaphore::new(permits)),
        }
    }

    /// Run the poll loop until shutdown.
    ///
    /// A failed poll (store or queue unreachable) pauses polling with a
    /// growing delay instead of crash-looping; a clean poll resets it.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Dispatcher started (poll every {}s, {} in-flight sends max, {} attempts max)",
            self.settings.poll_interval_secs, self.settings.max_in_flight,
            self.settings.max_attempts
        );

        let mut interval = tokio::time::interval(self.settings.poll_interval());
        let mut degraded: u32 = 0;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.clone().poll_once().await {
                        Ok(_) => degraded = 0,
                        Err(e) => {
                            degraded = degraded.saturating_add(1);
                            let pause = degraded_pause(degraded);
                            warn!(
                                "Poll failed ({} in a row): {}; pausing {:?}",
                                degraded, e, pause
                            );
                            tokio::select! {
                                _ = tokio::time::sleep(pause) => {}
                                _ = shutdown.changed() => break,
                            }
                        }
                    }
                }
                _ = shutdown.changed() => {
                    info!("Dispatcher shutting down");
                    break;
                }
            }
        }
    }

    /// Lease due jobs and spawn bounded workers for them. Returns how many
    /// jobs were leased.
    pub async fn poll_once(self: Arc<Self>) -> Result<usize, DispatchError> {
        let leases = self
            .queue
            .dequeue_due(Utc::now(), self.settings.max_in_flight.max(1))
            .await?;
        let count = leases.len();

        for lease in leases {
            let Ok(permit) = self.in_flight.clone().acquire_owned().await else {
                // Semaphore closed only at teardown.
                break;
            };
            let dispatcher = self.clone();
            tokio::spawn(async move {
                dispatcher.process_job(lease.job_id).await;
                drop(permit);
            });
        }

        Ok(count)
    }

    /// Process one leased job, turning any internal error into a nack so
    /// the job is never lost.
    async fn process_job(&self, job_id: Uuid) {
        if let Err(e) = self.handle_job(job_id).await {
            warn!("Processing job {} failed: {}; returning it to the queue", job_id, e);
            let delay = std::time::Duration::from_secs(self.settings.retry_base_secs.max(1));
            if let Err(e) = self.queue.nack(job_id, delay).await {
                error!("Failed to nack job {}: {}", job_id, e);
            }
        }
    }

    async fn handle_job(&self, job_id: Uuid) -> Result<(), DispatchError> {
        // Re-read state immediately before sending: the job or its charge
        // may have been canceled while the job sat in the queue.
        let Some(job) = self.store.get_job(job_id).await? else {
            warn!("Leased job {} is not in the store, dropping", job_id);
            self.queue.ack(job_id).await?;
            return Ok(());
        };
        if !job.is_pending() {
            debug!("Job {} is already {}, dropping lease", job_id, job.state);
            self.queue.ack(job_id).await?;
            return Ok(());
        }

        let Some(charge) = self.store.get_charge(job.charge_id).await? else {
            warn!("Charge {} of job {} is gone, canceling", job.charge_id, job.id);
            return self.cancel_job(job).await;
        };
        if !charge.is_active() {
            debug!(
                "Charge {} is {}, canceling reminder {}",
                charge.id, charge.status, job.id
            );
            return self.cancel_job(job).await;
        }

        let Some(participant) = self.store.get_participant(job.participant_id).await? else {
            return self.fail_unsendable(job, "participant no longer exists").await;
        };
        let Some(kind) = participant.preferred_channel() else {
            return self
                .fail_unsendable(job, "no deliverable opted-in contact")
                .await;
        };
        let Some(notifier) = self.channels.get(kind) else {
            return self
                .fail_unsendable(job, &format!("{} channel not configured", kind))
                .await;
        };
        let Some(recipient) = participant.contact_address(kind).map(str::to_string) else {
            return self
                .fail_unsendable(job, &format!("no {} contact on record", kind))
                .await;
        };

        // Amounts come from the live charge, so edits made after
        // scheduling are reflected in the message.
        let participants = self.store.list_participants(charge.id).await?;
        let share = match effective_shares(&charge, &participants) {
            Ok(shares) => shares
                .iter()
                .find(|(id, _)| *id == participant.id)
                .map(|(_, amount)| *amount)
                .unwrap_or_else(|| participant.share.amount_of(charge.amount)),
            Err(e) => {
                warn!("Share split of charge {} is inconsistent: {}", charge.id, e);
                participant.share.amount_of(charge.amount)
            }
        };
        let message = ReminderMessage::render(&charge, &participant, share);

        let mut job = job;
        job.record_attempt(kind);

        let outcome = timeout(
            self.settings.send_timeout(),
            notifier.send(&recipient, &message),
        )
        .await;

        match outcome {
            Ok(Ok(())) => self.finish_delivered(job, kind).await,
            Ok(Err(err)) if err.is_retryable() => {
                self.finish_retryable(job, kind, err.outcome(), err.to_string())
                    .await
            }
            Ok(Err(err)) => self.finish_terminal(job, kind, &participant, err).await,
            Err(_) => {
                self.finish_retryable(
                    job,
                    kind,
                    AttemptOutcome::TimedOut,
                    format!("send timed out after {}s", self.settings.send_timeout_secs),
                )
                .await
            }
        }
    }

    /// Success: audit, transition to sent, and schedule the next cycle.
    async fn finish_delivered(
        &self,
        mut job: ReminderJob,
        kind: ChannelKind,
    ) -> Result<(), DispatchError> {
        self.record(&job, kind, AttemptOutcome::Delivered, None).await?;

        job.mark_sent();
        if self.store.update_job_if(&job, JobState::Pending).await? {
            info!(
                "Reminder {} delivered to participant {} via {} (attempt {})",
                job.id, job.participant_id, kind, job.attempt
            );
            self.queue.ack(job.id).await?;
            self.scheduler.complete_cycle(&job).await?;
        } else {
            // Canceled while the send was in flight; the message went out,
            // the record keeps the cancellation.
            warn!("Job {} transitioned mid-send, leaving its state", job.id);
            self.queue.ack(job.id).await?;
        }
        Ok(())
    }

    /// Retryable failure: audit, then either back off or exhaust.
    async fn finish_retryable(
        &self,
        mut job: ReminderJob,
        kind: ChannelKind,
        outcome: AttemptOutcome,
        detail: String,
    ) -> Result<(), DispatchError> {
        self.record(&job, kind, outcome, Some(detail.clone())).await?;

        if job.attempt >= self.settings.max_attempts {
            job.mark_failed(&detail);
            if self.store.update_job_if(&job, JobState::Pending).await? {
                error!(
                    "Reminder {} for participant {} failed after {} attempts: {}",
                    job.id, job.participant_id, job.attempt, detail
                );
                self.queue.ack(job.id).await?;
                self.scheduler.complete_cycle(&job).await?;
            } else {
                self.queue.ack(job.id).await?;
            }
            return Ok(());
        }

        job.last_error = Some(detail.clone());
        let delay = backoff_delay(&self.settings, job.attempt);
        if self.store.update_job_if(&job, JobState::Pending).await? {
            debug!(
                "Reminder {} attempt {} failed ({}), retrying in {:?}",
                job.id, job.attempt, detail, delay
            );
            self.queue.nack(job.id, delay).await?;
        } else {
            // Canceled between send and bookkeeping.
            self.queue.ack(job.id).await?;
        }
        Ok(())
    }

    /// Terminal failure: audit, flag bad contacts, fail the job.
    async fn finish_terminal(
        &self,
        mut job: ReminderJob,
        kind: ChannelKind,
        participant: &Participant,
        err: SendError,
    ) -> Result<(), DispatchError> {
        self.record(&job, kind, err.outcome(), Some(err.to_string()))
            .await?;

        if matches!(err, SendError::InvalidRecipient(_)) {
            self.store.invalidate_contact(participant.id, kind).await?;
            info!(
                "Flagged {} contact of participant {} as invalid",
                kind, participant.id
            );
        }

        job.mark_failed(err.to_string());
        if self.store.update_job_if(&job, JobState::Pending).await? {
            error!(
                "Reminder {} for participant {} failed permanently: {}",
                job.id, job.participant_id, err
            );
            self.queue.ack(job.id).await?;
            self.scheduler.complete_cycle(&job).await?;
        } else {
            self.queue.ack(job.id).await?;
        }
        Ok(())
    }

    /// The job's charge is gone or inactive: cancel without sending.
    async fn cancel_job(&self, mut job: ReminderJob) -> Result<(), DispatchError> {
        job.mark_canceled();
        self.store.update_job_if(&job, JobState::Pending).await?;
        self.queue.ack(job.id).await?;
        Ok(())
    }

    /// The job cannot be delivered at all (no participant, no contact, no
    /// channel): fail it without a gateway attempt and move on.
    async fn fail_unsendable(
        &self,
        mut job: ReminderJob,
        reason: &str,
    ) -> Result<(), DispatchError> {
        error!("Reminder {} cannot be delivered: {}", job.id, reason);
        job.mark_failed(reason);
        self.store.update_job_if(&job, JobState::Pending).await?;
        self.queue.ack(job.id).await?;
        self.scheduler.complete_cycle(&job).await?;
        Ok(())
    }

    async fn record(
        &self,
        job: &ReminderJob,
        kind: ChannelKind,
        outcome: AttemptOutcome,
        error: Option<String>,
    ) -> Result<(), DispatchError> {
        let attempt = DeliveryAttempt::new(job.id, job.attempt, kind, outcome, error);
        self.store.append_attempt(&attempt).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
