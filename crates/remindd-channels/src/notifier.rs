//! Channel capability trait.

use async_trait::async_trait;

use remindd_model::ChannelKind;

use crate::error::SendError;
use crate::message::ReminderMessage;

/// A notification channel.
///
/// Implementations wrap one external gateway. The dispatcher selects a
/// channel per participant from their opt-in flags, never by inspecting the
/// concrete type.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Which channel this is.
    fn kind(&self) -> ChannelKind;

    /// Deliver a reminder to one recipient.
    async fn send(&self, recipient: &str, message: &ReminderMessage) -> Result<(), SendError>;
}
