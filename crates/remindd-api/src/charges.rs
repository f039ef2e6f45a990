//! Charge administration handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use remindd_model::{
    Cadence, ChargeStatus, Participant, RecurringCharge, Share, effective_shares,
};
use remindd_store::{ChargeStore, ParticipantStore};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a charge with its participants.
#[derive(Debug, Deserialize)]
pub struct CreateChargeRequest {
    pub group_id: String,
    pub name: String,
    /// Total in minor currency units.
    pub amount: i64,
    pub currency: String,
    pub cadence: Cadence,
    pub first_due_at: DateTime<Utc>,
    pub participants: Vec<ParticipantSpec>,
}

/// One participant in a create/add request.
#[derive(Debug, Deserialize)]
pub struct ParticipantSpec {
    pub display_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub share: Share,
    /// Defaults to true when the contact is present.
    #[serde(default)]
    pub sms_opt_in: Option<bool>,
    /// Defaults to true when the contact is present.
    #[serde(default)]
    pub email_opt_in: Option<bool>,
    #[serde(default)]
    pub designated_payer: bool,
}

impl ParticipantSpec {
    fn build(self, charge_id: Uuid) -> Result<Participant, ApiError> {
        let mut participant = Participant::new(charge_id, self.display_name, self.share);
        if let Some(phone) = self.phone {
            participant = participant.with_phone(phone);
        }
        if let Some(email) = self.email {
            participant = participant.with_email(email);
        }
        if let Some(sms) = self.sms_opt_in {
            participant.sms_opt_in = sms;
        }
        if let Some(email) = self.email_opt_in {
            participant.email_opt_in = email;
        }
        participant = participant.with_designated_payer(self.designated_payer);
        participant.validate()?;
        Ok(participant)
    }
}

/// Request body for mutating a charge.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateChargeRequest {
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub cadence: Option<Cadence>,
    #[serde(default)]
    pub next_due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<ChargeStatus>,
}

/// Response for a charge with its participants.
#[derive(Debug, Serialize)]
pub struct ChargeResponse {
    pub charge: RecurringCharge,
    pub participants: Vec<Participant>,
}

/// Response for listing charges.
#[derive(Debug, Serialize)]
pub struct ChargeListResponse {
    pub count: usize,
    pub charges: Vec<RecurringCharge>,
}

/// Create a charge and its participants, then schedule the first
/// reminders.
///
/// POST /charges
pub async fn create_charge(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateChargeRequest>,
) -> Result<(StatusCode, Json<ChargeResponse>), ApiError> {
    let charge = RecurringCharge::new(
        request.group_id,
        request.name,
        request.amount,
        request.currency,
        request.cadence,
        request.first_due_at,
    )?;

    let mut participants = Vec::with_capacity(request.participants.len());
    for spec in request.participants {
        participants.push(spec.build(charge.id)?);
    }
    // Shares must cover the total before anything is persisted.
    effective_shares(&charge, &participants)?;

    state.store.put_charge(&charge).await?;
    for participant in &participants {
        state.store.put_participant(participant).await?;
    }
    let outcome = state.scheduler.reconcile(charge.id).await?;

    info!(
        "Created charge {} ({} participant(s), {} reminder(s) scheduled)",
        charge.id,
        participants.len(),
        outcome.created
    );
    Ok((
        StatusCode::CREATED,
        Json(ChargeResponse {
            charge,
            participants,
        }),
    ))
}

/// List all charges.
///
/// GET /charges
pub async fn list_charges(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChargeListResponse>, ApiError> {
    let charges = state.store.list_charges().await?;
    Ok(Json(ChargeListResponse {
        count: charges.len(),
        charges,
    }))
}

/// Get a charge with its participants.
///
/// GET /charges/{id}
pub async fn get_charge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChargeResponse>, ApiError> {
    let charge = state
        .store
        .get_charge(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("charge {}", id)))?;
    let participants = state.store.list_participants(id).await?;
    Ok(Json(ChargeResponse {
        charge,
        participants,
    }))
}

/// Mutate a charge and reconcile its reminders.
///
/// PUT /charges/{id}
pub async fn update_charge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateChargeRequest>,
) -> Result<Json<ChargeResponse>, ApiError> {
    let mut charge = state
        .store
        .get_charge(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("charge {}", id)))?;

    if let Some(amount) = request.amount {
        charge.set_amount(amount)?;
    }
    if let Some(cadence) = request.cadence {
        charge.set_cadence(cadence)?;
    }
    if let Some(next_due_at) = request.next_due_at {
        charge.next_due_at = next_due_at;
        charge.updated_at = Utc::now();
    }
    if let Some(status) = request.status {
        charge.set_status(status);
    }

    // An amount change must still be covered by the shares.
    let participants = state.store.list_participants(id).await?;
    if !participants.is_empty() {
        effective_shares(&charge, &participants)?;
    }

    state.store.put_charge(&charge).await?;
    state.scheduler.reconcile(id).await?;

    info!("Updated charge {}", id);
    Ok(Json(ChargeResponse {
        charge,
        participants,
    }))
}

/// Cancel a charge: pending reminders are canceled in the same
/// reconciliation pass, history stays.
///
/// POST /charges/{id}/cancel
pub async fn cancel_charge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut charge = state
        .store
        .get_charge(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("charge {}", id)))?;

    charge.set_status(ChargeStatus::Canceled);
    state.store.put_charge(&charge).await?;
    let outcome = state.scheduler.reconcile(id).await?;

    info!(
        "Canceled charge {} ({} pending reminder(s) withdrawn)",
        id, outcome.canceled
    );
    Ok(Json(serde_json::json!({
        "charge_id": id,
        "canceled_jobs": outcome.canceled,
    })))
}

/// Add a participant to a charge.
///
/// POST /charges/{id}/participants
pub async fn add_participant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(spec): Json<ParticipantSpec>,
) -> Result<(StatusCode, Json<Participant>), ApiError> {
    let charge = state
        .store
        .get_charge(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("charge {}", id)))?;

    let participant = spec.build(charge.id)?;
    let mut participants = state.store.list_participants(id).await?;
    participants.push(participant.clone());
    effective_shares(&charge, &participants)?;

    state.store.put_participant(&participant).await?;
    state.scheduler.reconcile(id).await?;

    info!("Added participant {} to charge {}", participant.id, id);
    Ok((StatusCode::CREATED, Json(participant)))
}

/// List a charge's participants.
///
/// GET /charges/{id}/participants
pub async fn list_participants(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Participant>>, ApiError> {
    if state.store.get_charge(id).await?.is_none() {
        return Err(ApiError::NotFound(format!("charge {}", id)));
    }
    Ok(Json(state.store.list_participants(id).await?))
}

#[cfg(test)]
#[path = "charges_tests.rs"]
mod tests;
