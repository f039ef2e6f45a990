//! # Remindd Store
//!
//! Persistent document store for the reminder service.
//!
//! ## Features
//!
//! - Per-collection traits (`charges`, `participants`, `jobs`, `attempts`)
//! - Conditional operations the scheduler and dispatcher rely on:
//!   unique pending-job insert, compare-and-set job updates, atomic
//!   pending-job cancellation, conditional cycle advance
//! - In-memory store for tests and a JSON-document file store for
//!   single-node deployments
//!
//! The traits are the seam where a document database driver would plug in.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::{AttemptStore, ChargeStore, JobStore, ParticipantStore, Store};
