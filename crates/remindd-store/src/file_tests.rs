//! Tests for the file store.

use super::*;
use chrono::Utc;
use remindd_model::{AttemptOutcome, Cadence, Share};
use tempfile::TempDir;

fn charge() -> RecurringCharge {
    RecurringCharge::new(
        "group-1",
        "Streaming",
        1500,
        "USD",
        Cadence::Monthly { day: 1 },
        Utc::now(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_charge_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();
    let charge = charge();

    store.put_charge(&charge).await.unwrap();
    let loaded = store.get_charge(charge.id).await.unwrap().unwrap();
    assert_eq!(loaded.id, charge.id);
    assert_eq!(loaded.amount, 1500);

    assert!(store.get_charge(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_job_moves_between_state_directories() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();
    let charge = charge();

    let mut job = ReminderJob::new(charge.id, Uuid::new_v4(), 0, Utc::now());
    store.insert_pending(&job).await.unwrap();
    assert!(dir
        .path()
        .join("jobs/pending")
        .join(format!("{}.json", job.id))
        .exists());

    job.mark_sent();
    assert!(store.update_job_if(&job, JobState::Pending).await.unwrap());
    assert!(!dir
        .path()
        .join("jobs/pending")
        .join(format!("{}.json", job.id))
        .exists());
    assert!(dir
        .path()
        .join("jobs/sent")
        .join(format!("{}.json", job.id))
        .exists());

    let loaded = store.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(loaded.state, JobState::Sent);
}

#[tokio::test]
async fn test_insert_pending_unique_per_tuple() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();
    let charge = charge();
    let participant_id = Uuid::new_v4();

    store
        .insert_pending(&ReminderJob::new(charge.id, participant_id, 0, Utc::now()))
        .await
        .unwrap();
    let result = store
        .insert_pending(&ReminderJob::new(charge.id, participant_id, 0, Utc::now()))
        .await;
    assert!(matches!(result, Err(StoreError::Conflict(_))));
}

#[tokio::test]
async fn test_update_job_if_state_mismatch() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();
    let charge = charge();

    let mut job = ReminderJob::new(charge.id, Uuid::new_v4(), 0, Utc::now());
    store.insert_pending(&job).await.unwrap();

    let mut canceled = job.clone();
    canceled.mark_canceled();
    assert!(store
        .update_job_if(&canceled, JobState::Pending)
        .await
        .unwrap());

    job.mark_sent();
    assert!(!store.update_job_if(&job, JobState::Pending).await.unwrap());
}

#[tokio::test]
async fn test_cancel_pending_and_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let charge = charge();

    {
        let store = FileStore::open(dir.path()).await.unwrap();
        store.put_charge(&charge).await.unwrap();
        for cycle in [0, 0] {
            let job = ReminderJob::new(charge.id, Uuid::new_v4(), cycle, Utc::now());
            store.insert_pending(&job).await.unwrap();
        }
        let canceled = store.cancel_pending(charge.id).await.unwrap();
        assert_eq!(canceled.len(), 2);
    }

    // Everything is on disk; a fresh handle sees the same state.
    let store = FileStore::open(dir.path()).await.unwrap();
    assert!(store
        .pending_for_charge(charge.id)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        store
            .list_jobs(Some(JobState::Canceled))
            .await
            .unwrap()
            .len(),
        2
    );
    assert!(store.get_charge(charge.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_participants_filtered_by_charge() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();
    let charge = charge();

    let mine = Participant::new(charge.id, "Ana", Share::Fixed(1500))
        .with_email("ana@example.com")
        .with_designated_payer(true);
    let other = Participant::new(Uuid::new_v4(), "Zoe", Share::Fixed(1));
    store.put_participant(&mine).await.unwrap();
    store.put_participant(&other).await.unwrap();

    let listed = store.list_participants(charge.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].display_name, "Ana");
}

#[tokio::test]
async fn test_invalidate_contact_persists() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();
    let charge = charge();

    let p = Participant::new(charge.id, "Ana", Share::Fixed(1500))
        .with_phone("+15550001111")
        .with_email("ana@example.com");
    store.put_participant(&p).await.unwrap();

    store
        .invalidate_contact(p.id, ChannelKind::Sms)
        .await
        .unwrap();
    let loaded = store.get_participant(p.id).await.unwrap().unwrap();
    assert!(!loaded.phone.as_ref().unwrap().valid);
    assert_eq!(loaded.preferred_channel(), Some(ChannelKind::Email));
}

#[tokio::test]
async fn test_attempt_log_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();
    let job_id = Uuid::new_v4();

    for attempt in 1..=3 {
        store
            .append_attempt(&DeliveryAttempt::new(
                job_id,
                attempt,
                ChannelKind::Email,
                AttemptOutcome::TransientError,
                Some("503".to_string()),
            ))
            .await
            .unwrap();
    }

    let attempts = store.attempts_for_job(job_id).await.unwrap();
    assert_eq!(attempts.len(), 3);
    assert_eq!(attempts[0].attempt, 1);
    assert_eq!(attempts[2].attempt, 3);

    assert!(store.attempts_for_job(Uuid::new_v4()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ping() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();
    store.ping().await.unwrap();
}
