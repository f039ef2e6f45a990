//! SMS gateway channel.

use async_trait::async_trait;
use tracing::debug;

use remindd_model::ChannelKind;

use crate::error::SendError;
use crate::message::ReminderMessage;
use crate::notifier::Notifier;

/// HTTP SMS gateway client.
///
/// Speaks the common `POST {from, to, body}` JSON shape with bearer-token
/// auth. The token comes from configuration, never a literal.
pub struct SmsGateway {
    api_url: String,
    api_token: String,
    sender: String,
    client: reqwest::Client,
}

impl SmsGateway {
    /// Create a new SMS gateway client.
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
impl Notifier for SmsGateway {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Sms
    }

    async fn send(&self, recipient: &str, message: &ReminderMessage) -> Result<(), SendError> {
        let payload = serde_json::json!({
            "from": self.sender,
            "to": recipient,
            "body": message.body,
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SendError::Transient(format!("SMS request failed: {}", e)))?;

        if response.status().is_success() {
            debug!("SMS accepted for {}", recipient);
            Ok(())
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(SendError::from_status(
                status,
                format!("SMS gateway returned {}: {}", status, body),
            ))
        }
    }
}

#[cfg(test)]
#[path = "sms_tests.rs"]
mod tests;
