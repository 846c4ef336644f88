//! Chatwoot Application API client used to post replies and private notes.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::config::ChatwootConfig;
use crate::error::{RelayError, Result};
use crate::types::{ReplyDestination, Visibility};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Longest error body kept in logs.
const ERROR_BODY_LIMIT: usize = 500;

/// Where mediated replies are delivered.
#[async_trait]
pub trait PostingSink: Send + Sync {
    /// Whether the sink has everything it needs to post.
    fn is_configured(&self) -> bool;

    /// Posts one message; failures are logged by the sink and reported as `false`.
    async fn post_message(&self, destination: &ReplyDestination) -> bool;
}

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    content: &'a str,
    message_type: &'static str,
    private: bool,
}

pub struct ChatwootClient {
    config: ChatwootConfig,
    client: reqwest::Client,
}

impl ChatwootClient {
    pub fn new(config: ChatwootConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { config, client })
    }

    fn messages_url(&self, conversation_id: i64) -> String {
        format!(
            "{}/api/v1/accounts/{}/conversations/{}/messages",
            self.config.base_url, self.config.account_id, conversation_id
        )
    }

    /// Sends the message and surfaces any failure as an error.
    pub async fn send(&self, destination: &ReplyDestination) -> Result<()> {
        if !self.config.is_complete() {
            return Err(RelayError::Config(
                "Chatwoot credentials are not configured".to_string(),
            ));
        }

        let request = CreateMessageRequest {
            content: &destination.content,
            message_type: "outgoing",
            private: destination.visibility.is_private(),
        };
        debug!(
            "Posting {} characters to conversation {} ({})",
            destination.content.len(),
            destination.conversation_id,
            destination.visibility
        );

        let response = self
            .client
            .post(self.messages_url(destination.conversation_id))
            .header("api_access_token", &self.config.api_access_token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
            return Err(RelayError::ChatwootApi {
                status,
                message: message.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl PostingSink for ChatwootClient {
    fn is_configured(&self) -> bool {
        self.config.is_complete()
    }

    async fn post_message(&self, destination: &ReplyDestination) -> bool {
        match self.send(destination).await {
            Ok(()) => {
                info!(
                    "Message posted to conversation {} (private={})",
                    destination.conversation_id,
                    destination.visibility == Visibility::Private
                );
                true
            }
            Err(RelayError::Config(e)) => {
                warn!("Cannot post message: {e}");
                false
            }
            Err(e) => {
                error!(
                    "Failed to post message to conversation {}: {e}",
                    destination.conversation_id
                );
                false
            }
        }
    }
}
