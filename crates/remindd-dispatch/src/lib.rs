//! # Remindd Dispatch
//!
//! Delivery dispatcher: leases due reminder jobs from the work queue,
//! renders and sends them through the participant's channel, and records
//! every outcome.
//!
//! ## Guarantees
//!
//! - In-flight sends are bounded by a semaphore
//! - Every send carries a timeout; a timeout is a transient failure
//! - Transient failures retry with capped exponential backoff plus jitter
//!   until the attempt budget runs out, then the job is marked failed and
//!   surfaced; nothing is silently dropped
//! - Permanent failures flag the participant contact invalid
//! - Jobs canceled while queued are dropped without sending
//! - Store or queue outages pause polling instead of crash-looping

pub mod backoff;
pub mod channel_set;
pub mod dispatcher;
pub mod error;

pub use backoff::{backoff_delay, degraded_pause};
pub use channel_set::ChannelSet;
pub use dispatcher::Dispatcher;
pub use error::DispatchError;
