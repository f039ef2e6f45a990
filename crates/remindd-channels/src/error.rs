//! Delivery error taxonomy.

use remindd_model::AttemptOutcome;
use thiserror::Error;

/// Send failure, classified for the dispatcher's retry decision.
#[derive(Debug, Error)]
pub enum SendError {
    /// The gateway throttled us; retry with backoff.
    #[error("Rate limited by gateway")]
    RateLimited,

    /// The recipient address is not deliverable; terminal.
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    /// Transient gateway or transport failure; retry with backoff.
    #[error("Transient delivery failure: {0}")]
    Transient(String),

    /// Non-retryable gateway failure; terminal.
    #[error("Permanent delivery failure: {0}")]
    Permanent(String),
}

impl SendError {
    /// Classify an HTTP gateway response status.
    ///
    /// 429 is throttling, the request-shaped 4xx codes mean the recipient
    /// is bad, other 4xx are permanent, and 5xx is the gateway's problem.
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match status {
            429 => SendError::RateLimited,
            400 | 404 | 422 => SendError::InvalidRecipient(detail),
            s if (400..500).contains(&s) => SendError::Permanent(detail),
            _ => SendError::Transient(detail),
        }
    }

    /// Whether the dispatcher should retry after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SendError::RateLimited | SendError::Transient(_))
    }

    /// The audit-log outcome for this error.
    pub fn outcome(&self) -> AttemptOutcome {
        match self {
            SendError::RateLimited => AttemptOutcome::RateLimited,
            SendError::InvalidRecipient(_) => AttemptOutcome::InvalidRecipient,
            SendError::Transient(_) => AttemptOutcome::TransientError,
            SendError::Permanent(_) => AttemptOutcome::PermanentError,
        }
    }
}
