//! Domain validation errors.

use thiserror::Error;

/// Validation error types.
///
/// Raised when charge or participant data is rejected at creation or
/// mutation time. Never produced by the delivery path.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Charge amount must be a positive number of minor units.
    #[error("Charge amount must be positive, got {0}")]
    NonPositiveAmount(i64),

    /// Currency must be a three-letter ISO code.
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    /// Weekly cadence weekday out of range.
    #[error("Cadence weekday out of range (0-6): {0}")]
    WeekdayOutOfRange(u8),

    /// Monthly cadence day out of range.
    #[error("Cadence day of month out of range (1-31): {0}")]
    DayOfMonthOutOfRange(u8),

    /// Fixed share must not be negative.
    #[error("Fixed share must not be negative, got {0}")]
    NegativeShare(i64),

    /// Percent share above 100%.
    #[error("Percent share out of range (0-10000 basis points): {0}")]
    PercentOutOfRange(u32),

    /// A charge needs exactly one designated payer.
    #[error("Charge requires exactly one designated payer, found {0}")]
    DesignatedPayerCount(usize),

    /// Shares add up to more than the charge total.
    #[error("Participant shares exceed the charge total by {0} minor units")]
    SharesExceedTotal(i64),

    /// Shares fall short of the charge total by more than rounding allows.
    #[error("Participant shares fall short of the charge total by {0} minor units")]
    SharesShortOfTotal(i64),

    /// Participant opted into a channel with no usable contact.
    #[error("Participant '{0}' has no contact for an opted-in channel")]
    MissingContact(String),

    /// Participant not part of the charge being split.
    #[error("Participant {0} does not belong to the charge")]
    UnknownParticipant(uuid::Uuid),
}
