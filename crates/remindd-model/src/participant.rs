//! Participants, contact channels, and share splitting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::charge::RecurringCharge;
use crate::error::ValidationError;
use crate::job::ChannelKind;

/// A contact address with a validity flag.
///
/// The flag is cleared when a gateway reports the recipient invalid, so
/// future scheduling skips the channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactPoint {
    /// Phone number or email address.
    pub address: String,
    /// Whether the address is believed deliverable.
    pub valid: bool,
}

impl ContactPoint {
    /// Create a valid contact point.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            valid: true,
        }
    }
}

/// A participant's share of a charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Share {
    /// Fixed amount in minor currency units.
    Fixed(i64),
    /// Percentage of the charge total, in basis points (10000 = 100%).
    Percent(u32),
}

impl Share {
    /// The nominal amount of this share for a given charge total.
    ///
    /// Percent shares truncate toward zero; the lost remainder is assigned
    /// to the designated payer by [`effective_shares`].
    pub fn amount_of(&self, total: i64) -> i64 {
        match *self {
            Share::Fixed(amount) => amount,
            Share::Percent(basis_points) => total * i64::from(basis_points) / 10_000,
        }
    }

    /// Validate the share in isolation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match *self {
            Share::Fixed(amount) if amount < 0 => Err(ValidationError::NegativeShare(amount)),
            Share::Percent(bp) if bp > 10_000 => Err(ValidationError::PercentOutOfRange(bp)),
            _ => Ok(()),
        }
    }
}

/// A person who owes a share of a charge and receives reminders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    /// Unique participant ID.
    pub id: Uuid,
    /// Charge this participant belongs to.
    pub charge_id: Uuid,
    /// Display name, used in reminder messages.
    pub display_name: String,
    /// Phone contact, if any.
    pub phone: Option<ContactPoint>,
    /// Email contact, if any.
    pub email: Option<ContactPoint>,
    /// Share of the charge total.
    pub share: Share,
    /// Opted into SMS reminders.
    pub sms_opt_in: bool,
    /// Opted into email reminders.
    pub email_opt_in: bool,
    /// Receives the rounding remainder of the split.
    pub designated_payer: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Participant {
    /// Create a new participant with no contacts and no opt-ins.
    pub fn new(charge_id: Uuid, display_name: impl Into<String>, share: Share) -> Self {
        Self {
            id: Uuid::new_v4(),
            charge_id,
            display_name: display_name.into(),
            phone: None,
            email: None,
            share,
            sms_opt_in: false,
            email_opt_in: false,
            designated_payer: false,
            created_at: Utc::now(),
        }
    }

    /// Set the phone contact and opt into SMS.
    pub fn with_phone(mut self, number: impl Into<String>) -> Self {
        self.phone = Some(ContactPoint::new(number));
        self.sms_opt_in = true;
        self
    }

    /// Set the email contact and opt into email.
    pub fn with_email(mut self, address: impl Into<String>) -> Self {
        self.email = Some(ContactPoint::new(address));
        self.email_opt_in = true;
        self
    }

    /// Mark as the designated payer.
    pub fn with_designated_payer(mut self, designated: bool) -> Self {
        self.designated_payer = designated;
        self
    }

    /// The channel reminders should use, per opt-in flags and contact
    /// validity. SMS wins when both are usable.
    pub fn preferred_channel(&self) -> Option<ChannelKind> {
        if self.sms_opt_in && self.phone.as_ref().is_some_and(|c| c.valid) {
            return Some(ChannelKind::Sms);
        }
        if self.email_opt_in && self.email.as_ref().is_some_and(|c| c.valid) {
            return Some(ChannelKind::Email);
        }
        None
    }

    /// The contact address for a channel, if present and valid.
    pub fn contact_address(&self, channel: ChannelKind) -> Option<&str> {
        let contact = match channel {
            ChannelKind::Sms => self.phone.as_ref(),
            ChannelKind::Email => self.email.as_ref(),
        }?;
        contact.valid.then_some(contact.address.as_str())
    }

    /// Validate the participant in isolation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.share.validate()?;
        if self.sms_opt_in && self.phone.is_none() {
            return Err(ValidationError::MissingContact(self.display_name.clone()));
        }
        if self.email_opt_in && self.email.is_none() {
            return Err(ValidationError::MissingContact(self.display_name.clone()));
        }
        Ok(())
    }
}

/// Compute every participant's effective share of a charge.
///
/// Percent shares truncate toward zero, so the nominal sum can fall short
/// of the total by up to one minor unit per percent share. That remainder
/// is assigned to the designated payer, which makes the allocation
/// deterministic and exactly covering the total.
///
/// Fails when the shares overshoot the total, undershoot it by more than
/// truncation can explain, or when there is not exactly one designated
/// payer.
pub fn effective_shares(
    charge: &RecurringCharge,
    participants: &[Participant],
) -> Result<Vec<(Uuid, i64)>, ValidationError> {
    for p in participants {
        p.share.validate()?;
        if p.charge_id != charge.id {
            return Err(ValidationError::UnknownParticipant(p.id));
        }
    }

    let payers = participants.iter().filter(|p| p.designated_payer).count();
    if payers != 1 {
        return Err(ValidationError::DesignatedPayerCount(payers));
    }

    let nominal: i64 = participants
        .iter()
        .map(|p| p.share.amount_of(charge.amount))
        .sum();
    let remainder = charge.amount - nominal;
    if remainder < 0 {
        return Err(ValidationError::SharesExceedTotal(-remainder));
    }
    let percent_shares = participants
        .iter()
        .filter(|p| matches!(p.share, Share::Percent(_)))
        .count() as i64;
    if remainder > percent_shares.max(1) {
        return Err(ValidationError::SharesShortOfTotal(remainder));
    }

    Ok(participants
        .iter()
        .map(|p| {
            let mut amount = p.share.amount_of(charge.amount);
            if p.designated_payer {
                amount += remainder;
            }
            (p.id, amount)
        })
        .collect())
}

#[cfg(test)]
#[path = "participant_tests.rs"]
mod tests;
