//! Email gateway channel.

use async_trait::async_trait;
use tracing::debug;

use remindd_model::ChannelKind;

use crate::error::SendError;
use crate::message::ReminderMessage;
use crate::notifier::Notifier;

/// HTTP transactional-email gateway client.
///
/// Posts `{from, to, subject, text}` JSON with bearer-token auth, the shape
/// shared by the common transactional providers.
pub struct EmailGateway {
    api_url: String,
    api_token: String,
    sender: String,
    client: reqwest::Client,
}

impl EmailGateway {
    /// Create a new email gateway client.
    pub fn new(
        api_url: impl Into<String>,
        api_token: impl Into<String>,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            api_token: api_token.into(),
            sender: sender.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for EmailGateway {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn send(&self, recipient: &str, message: &ReminderMessage) -> Result<(), SendError> {
        let payload = serde_json::json!({
            "from": self.sender,
            "to": recipient,
            "subject": message.subject,
            "text": message.body,
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SendError::Transient(format!("Email request failed: {}", e)))?;

        if response.status().is_success() {
            debug!("Email accepted for {}", recipient);
            Ok(())
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(SendError::from_status(
                status,
                format!("Email gateway returned {}: {}", status, body),
            ))
        }
    }
}

#[cfg(test)]
#[path = "email_tests.rs"]
mod tests;
