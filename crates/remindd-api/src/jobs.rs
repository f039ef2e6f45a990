//! Reminder job inspection handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use remindd_model::{DeliveryAttempt, JobState, ReminderJob};
use remindd_store::{AttemptStore, JobStore};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for listing jobs.
#[derive(Debug, Default, Deserialize)]
pub struct JobFilter {
    /// Filter by state (`pending`, `sent`, `failed`, `canceled`).
    #[serde(default)]
    pub state: Option<String>,
}

/// Response for listing jobs.
#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub count: usize,
    pub jobs: Vec<ReminderJob>,
}

/// Response for a job's delivery audit log.
#[derive(Debug, Serialize)]
pub struct AttemptListResponse {
    pub job_id: Uuid,
    pub count: usize,
    pub attempts: Vec<DeliveryAttempt>,
}

/// List reminder jobs, optionally filtered by state. Failed jobs are the
/// operator's follow-up list.
///
/// GET /jobs?state=failed
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<JobFilter>,
) -> Result<Json<JobListResponse>, ApiError> {
    let job_state = filter
        .state
        .map(|s| {
            s.parse::<JobState>()
                .map_err(ApiError::BadRequest)
        })
        .transpose()?;

    let jobs = state.store.list_jobs(job_state).await?;
    Ok(Json(JobListResponse {
        count: jobs.len(),
        jobs,
    }))
}

/// Get a job by ID.
///
/// GET /jobs/{id}
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReminderJob>, ApiError> {
    let job = state
        .store
        .get_job(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("job {}", id)))?;
    Ok(Json(job))
}

/// Get a job's delivery attempts.
///
/// GET /jobs/{id}/attempts
pub async fn job_attempts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<AttemptListResponse>, ApiError> {
    if state.store.get_job(id).await?.is_none() {
        return Err(ApiError::NotFound(format!("job {}", id)));
    }
    let attempts = state.store.attempts_for_job(id).await?;
    Ok(Json(AttemptListResponse {
        job_id: id,
        count: attempts.len(),
        attempts,
    }))
}
