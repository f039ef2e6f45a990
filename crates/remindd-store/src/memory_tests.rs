//! Tests for the in-memory store.

use super::*;
use chrono::Utc;
use remindd_model::{AttemptOutcome, Cadence, Share};

fn charge() -> RecurringCharge {
    RecurringCharge::new(
        "group-1",
        "Utilities",
        6000,
        "USD",
        Cadence::Monthly { day: 15 },
        Utc::now(),
    )
    .unwrap()
}

fn participant(charge_id: Uuid) -> Participant {
    Participant::new(charge_id, "Ana", Share::Percent(10_000))
        .with_phone("+15550001111")
        .with_designated_payer(true)
}

#[tokio::test]
async fn test_charge_round_trip() {
    let store = MemoryStore::new();
    let charge = charge();

    store.put_charge(&charge).await.unwrap();
    let loaded = store.get_charge(charge.id).await.unwrap().unwrap();
    assert_eq!(loaded.name, "Utilities");

    assert!(store.get_charge(Uuid::new_v4()).await.unwrap().is_none());
    assert_eq!(store.list_charges().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_advance_cycle_is_conditional() {
    let store = MemoryStore::new();
    let charge = charge();
    let due = charge.next_due_at;
    store.put_charge(&charge).await.unwrap();

    let advanced = store.advance_cycle(charge.id, 1).await.unwrap();
    assert_eq!(advanced.cycle, 1);
    assert!(advanced.next_due_at > due);

    // A second completion of the same cycle is a no-op.
    let again = store.advance_cycle(charge.id, 1).await.unwrap();
    assert_eq!(again.cycle, 1);
    assert_eq!(again.next_due_at, advanced.next_due_at);
}

#[tokio::test]
async fn test_insert_pending_rejects_duplicates() {
    let store = MemoryStore::new();
    let charge = charge();
    let p = participant(charge.id);

    let job = ReminderJob::new(charge.id, p.id, 0, Utc::now());
    store.insert_pending(&job).await.unwrap();

    let dup = ReminderJob::new(charge.id, p.id, 0, Utc::now());
    assert!(matches!(
        store.insert_pending(&dup).await,
        Err(StoreError::Conflict(_))
    ));

    // A different cycle is a different tuple.
    let next_cycle = ReminderJob::new(charge.id, p.id, 1, Utc::now());
    store.insert_pending(&next_cycle).await.unwrap();
}

#[tokio::test]
async fn test_duplicate_allowed_after_cancel() {
    let store = MemoryStore::new();
    let charge = charge();
    let p = participant(charge.id);

    let mut job = ReminderJob::new(charge.id, p.id, 0, Utc::now());
    store.insert_pending(&job).await.unwrap();

    job.mark_canceled();
    assert!(store.update_job_if(&job, JobState::Pending).await.unwrap());

    // Canceled history stays, but the tuple is free again.
    let replacement = ReminderJob::new(charge.id, p.id, 0, Utc::now());
    store.insert_pending(&replacement).await.unwrap();
}

#[tokio::test]
async fn test_update_job_if_detects_race() {
    let store = MemoryStore::new();
    let charge = charge();
    let p = participant(charge.id);

    let mut job = ReminderJob::new(charge.id, p.id, 0, Utc::now());
    store.insert_pending(&job).await.unwrap();

    // Another writer cancels first.
    let mut canceled = job.clone();
    canceled.mark_canceled();
    assert!(store
        .update_job_if(&canceled, JobState::Pending)
        .await
        .unwrap());

    // The stale sent transition loses.
    job.mark_sent();
    assert!(!store.update_job_if(&job, JobState::Pending).await.unwrap());
    let stored = store.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(stored.state, JobState::Canceled);
}

#[tokio::test]
async fn test_cancel_pending_sweeps_charge() {
    let store = MemoryStore::new();
    let charge = charge();
    let a = participant(charge.id);
    let b = Participant::new(charge.id, "Ben", Share::Fixed(0)).with_email("ben@example.com");

    store
        .insert_pending(&ReminderJob::new(charge.id, a.id, 0, Utc::now()))
        .await
        .unwrap();
    store
        .insert_pending(&ReminderJob::new(charge.id, b.id, 0, Utc::now()))
        .await
        .unwrap();

    // A job of another charge is untouched.
    let other = ReminderJob::new(Uuid::new_v4(), a.id, 0, Utc::now());
    store.insert_pending(&other).await.unwrap();

    let canceled = store.cancel_pending(charge.id).await.unwrap();
    assert_eq!(canceled.len(), 2);
    assert!(store
        .pending_for_charge(charge.id)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(store.pending_for_charge(other.charge_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_jobs_filters_by_state() {
    let store = MemoryStore::new();
    let charge = charge();
    let p = participant(charge.id);

    let mut sent = ReminderJob::new(charge.id, p.id, 0, Utc::now());
    store.insert_pending(&sent).await.unwrap();
    sent.mark_sent();
    store.update_job_if(&sent, JobState::Pending).await.unwrap();

    store
        .insert_pending(&ReminderJob::new(charge.id, p.id, 1, Utc::now()))
        .await
        .unwrap();

    assert_eq!(store.list_jobs(None).await.unwrap().len(), 2);
    assert_eq!(
        store.list_jobs(Some(JobState::Sent)).await.unwrap().len(),
        1
    );
    assert_eq!(
        store.list_jobs(Some(JobState::Failed)).await.unwrap().len(),
        0
    );
}

#[tokio::test]
async fn test_invalidate_contact() {
    let store = MemoryStore::new();
    let charge = charge();
    let p = participant(charge.id);
    store.put_participant(&p).await.unwrap();

    store
        .invalidate_contact(p.id, ChannelKind::Sms)
        .await
        .unwrap();
    let loaded = store.get_participant(p.id).await.unwrap().unwrap();
    assert!(!loaded.phone.as_ref().unwrap().valid);
    assert_eq!(loaded.preferred_channel(), None);
}

#[tokio::test]
async fn test_attempts_are_ordered() {
    let store = MemoryStore::new();
    let job_id = Uuid::new_v4();

    for attempt in [2_u32, 1, 3] {
        let record = DeliveryAttempt::new(
            job_id,
            attempt,
            ChannelKind::Sms,
            AttemptOutcome::RateLimited,
            None,
        );
        store.append_attempt(&record).await.unwrap();
    }
    store
        .append_attempt(&DeliveryAttempt::new(
            Uuid::new_v4(),
            1,
            ChannelKind::Email,
            AttemptOutcome::Delivered,
            None,
        ))
        .await
        .unwrap();

    let attempts = store.attempts_for_job(job_id).await.unwrap();
    assert_eq!(attempts.len(), 3);
    assert_eq!(
        attempts.iter().map(|a| a.attempt).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}
