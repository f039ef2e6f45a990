//! Recurring charge definition and cadence arithmetic.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Charge status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeStatus {
    /// Charge recurs and generates reminder jobs.
    Active,
    /// Charge is temporarily suspended; pending jobs are canceled.
    Paused,
    /// Charge is gone for good; historical jobs are retained.
    Canceled,
}

impl std::fmt::Display for ChargeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChargeStatus::Active => write!(f, "active"),
            ChargeStatus::Paused => write!(f, "paused"),
            ChargeStatus::Canceled => write!(f, "canceled"),
        }
    }
}

/// How often a charge recurs.
///
/// A cadence is an interval plus an anchor day. Monthly anchors are clamped
/// to the target month's length (an anchor of 31 lands on Feb 28/29).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "lowercase")]
pub enum Cadence {
    /// Every week. `weekday` is 0 = Monday through 6 = Sunday.
    Weekly { weekday: u8 },
    /// Every month on `day` (1-31), clamped to the month's length.
    Monthly { day: u8 },
}

impl Cadence {
    /// Validate the anchor day.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match *self {
            Cadence::Weekly { weekday } if weekday > 6 => {
                Err(ValidationError::WeekdayOutOfRange(weekday))
            }
            Cadence::Monthly { day } if day == 0 || day > 31 => {
                Err(ValidationError::DayOfMonthOutOfRange(day))
            }
            _ => Ok(()),
        }
    }

    /// The due date one period after `after`, preserving the time of day.
    pub fn advance(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        match *self {
            Cadence::Weekly { .. } => after + Duration::days(7),
            Cadence::Monthly { day } => {
                let (year, month) = if after.month() == 12 {
                    (after.year() + 1, 1)
                } else {
                    (after.year(), after.month() + 1)
                };
                let day = u32::from(day).min(days_in_month(year, month));
                match NaiveDate::from_ymd_opt(year, month, day) {
                    Some(date) => date.and_time(after.time()).and_utc(),
                    // Unreachable once the day is clamped; fall back to a flat month.
                    None => after + Duration::days(30),
                }
            }
        }
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
                29
            } else {
                28
            }
        }
    }
}

/// A recurring shared bill split among participants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringCharge {
    /// Unique charge ID.
    pub id: Uuid,
    /// Owning group.
    pub group_id: String,
    /// Human-readable bill name, used in reminder messages.
    pub name: String,
    /// Total amount in minor currency units.
    pub amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Recurrence rule.
    pub cadence: Cadence,
    /// Due date of the current cycle.
    pub next_due_at: DateTime<Utc>,
    /// Index of the current cycle, incremented each time the due date advances.
    pub cycle: u32,
    /// Current status.
    pub status: ChargeStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl RecurringCharge {
    /// Create a new active charge. Validates amount, currency, and cadence.
    pub fn new(
        group_id: impl Into<String>,
        name: impl Into<String>,
        amount: i64,
        currency: impl Into<String>,
        cadence: Cadence,
        first_due_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if amount <= 0 {
            return Err(ValidationError::NonPositiveAmount(amount));
        }
        let currency = currency.into();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidCurrency(currency));
        }
        cadence.validate()?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            group_id: group_id.into(),
            name: name.into(),
            amount,
            currency,
            cadence,
            next_due_at: first_due_at,
            cycle: 0,
            status: ChargeStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether the charge still generates reminder jobs.
    pub fn is_active(&self) -> bool {
        self.status == ChargeStatus::Active
    }

    /// Move the charge to the next cycle.
    pub fn advance_cycle(&mut self) {
        self.next_due_at = self.cadence.advance(self.next_due_at);
        self.cycle += 1;
        self.updated_at = Utc::now();
    }

    /// Update the amount. Validates positivity.
    pub fn set_amount(&mut self, amount: i64) -> Result<(), ValidationError> {
        if amount <= 0 {
            return Err(ValidationError::NonPositiveAmount(amount));
        }
        self.amount = amount;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Replace the cadence. Validates the anchor.
    pub fn set_cadence(&mut self, cadence: Cadence) -> Result<(), ValidationError> {
        cadence.validate()?;
        self.cadence = cadence;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Change the status.
    pub fn set_status(&mut self, status: ChargeStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}
