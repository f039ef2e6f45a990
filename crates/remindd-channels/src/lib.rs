//! # Remindd Channels
//!
//! Notification channel implementations.
//!
//! Channels are consumed through the [`Notifier`] capability trait; the
//! dispatcher picks one per participant from their opt-in flags. Failures
//! carry the retry taxonomy the dispatcher acts on: `RateLimited` and
//! `Transient` are retried with backoff, `InvalidRecipient` and `Permanent`
//! are terminal.

pub mod email;
pub mod error;
pub mod message;
pub mod notifier;
pub mod sms;

pub use email::EmailGateway;
pub use error::SendError;
pub use message::ReminderMessage;
pub use notifier::Notifier;
pub use sms::SmsGateway;
