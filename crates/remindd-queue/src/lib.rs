//! # Remindd Queue
//!
//! Work queue for due reminder jobs.
//!
//! ## Features
//!
//! - `enqueue` / `dequeue_due` / `ack` / `nack` contract
//! - At-least-once delivery: leased jobs are invisible until ack, nack, or
//!   lease expiry (visibility timeout), then redelivered
//! - Delivery in non-decreasing `not_before` order
//!
//! The [`WorkQueue`] trait is the seam where an external broker would plug
//! in; [`MemoryQueue`] is the single-node implementation, rebuilt from the
//! store at startup.

pub mod error;
pub mod memory;
pub mod queue;

pub use error::QueueError;
pub use memory::MemoryQueue;
pub use queue::{Lease, WorkQueue};
