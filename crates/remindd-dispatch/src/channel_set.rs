//! Configured notification channels.

use std::sync::Arc;

use remindd_channels::Notifier;
use remindd_model::ChannelKind;

/// The channels this process can deliver through.
///
/// Selection happens by [`ChannelKind`] from the participant's opt-in
/// flags; the dispatcher never inspects concrete gateway types.
#[derive(Default, Clone)]
pub struct ChannelSet {
    sms: Option<Arc<dyn Notifier>>,
    email: Option<Arc<dyn Notifier>>,
}

impl ChannelSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the SMS channel.
    pub fn with_sms(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.sms = Some(notifier);
        self
    }

    /// Attach the email channel.
    pub fn with_email(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.email = Some(notifier);
        self
    }

    /// Look up the channel for a kind.
    pub fn get(&self, kind: ChannelKind) -> Option<Arc<dyn Notifier>> {
        match kind {
            ChannelKind::Sms => self.sms.clone(),
            ChannelKind::Email => self.email.clone(),
        }
    }

    /// Whether no channel is configured.
    pub fn is_empty(&self) -> bool {
        self.sms.is_none() && self.email.is_none()
    }
}
