//! Queue errors.

use thiserror::Error;

/// Queue error types.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Queue is full.
    #[error("Queue is full")]
    Full,

    /// The backing broker cannot be reached; callers should back off.
    #[error("Queue unavailable: {0}")]
    Unavailable(String),
}
