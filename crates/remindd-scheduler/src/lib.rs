//! # Remindd Scheduler
//!
//! Scheduler core: decides when each participant's reminder fires and keeps
//! the rolling one-ahead job window consistent with the charges.
//!
//! ## Guarantees
//!
//! - Fire time is `next_due_at - lead_time`, clamped to now
//! - At most one pending job per (charge, participant, cycle); reconciling
//!   the same mutation twice creates nothing new
//! - Reconciliation is serialized per charge
//! - A cycle advances exactly once no matter how many participant jobs
//!   finish it

pub mod error;
pub mod scheduler;

pub use error::SchedulerError;
pub use scheduler::{ReconcileOutcome, Scheduler};
