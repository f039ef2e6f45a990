//! Store errors.

use thiserror::Error;

/// Store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint rejected the write.
    #[error("Conflicting write: {0}")]
    Conflict(String),

    /// The backing store cannot be reached; callers should back off.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Storage error (IO, serialization).
    #[error("Storage error: {0}")]
    Storage(String),
}
