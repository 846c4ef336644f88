//! Chatwoot webhook payload, reduced to the fields the relay reads.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Event kind Chatwoot sends when a message is added to a conversation.
pub const MESSAGE_CREATED: &str = "message_created";
/// Message type of customer-authored messages.
pub const INCOMING: &str = "incoming";

/// Conversation or contact object attached to a webhook event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub custom_attributes: Option<Map<String, Value>>,
    #[serde(default)]
    pub additional_attributes: Option<Map<String, Value>>,
}

impl Metadata {
    /// Custom attributes, or additional attributes when no custom ones are set.
    pub fn attributes(&self) -> Option<&Map<String, Value>> {
        self.custom_attributes
            .as_ref()
            .filter(|attrs| !attrs.is_empty())
            .or(self.additional_attributes.as_ref())
    }

    /// Attribute value rendered as a trimmed string; `None` when absent or blank.
    pub fn attribute(&self, key: &str) -> Option<String> {
        let value = self.attributes()?.get(key)?;
        let text = match value {
            Value::Null => return None,
            Value::String(s) => s.trim().to_string(),
            other => other.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

/// Inbound webhook event. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundEvent {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub conversation: Option<Metadata>,
    #[serde(default)]
    pub contact: Option<Metadata>,
}

impl InboundEvent {
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Event kind, empty when absent or null.
    pub fn event_kind(&self) -> &str {
        self.event.as_deref().unwrap_or_default()
    }

    /// Message type, empty when absent or null.
    pub fn message_kind(&self) -> &str {
        self.message_type.as_deref().unwrap_or_default()
    }

    pub fn raw_content(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// Content kind, `text` when the payload leaves it out.
    pub fn content_kind(&self) -> &str {
        self.content_type
            .as_deref()
            .map(str::trim)
            .filter(|kind| !kind.is_empty())
            .unwrap_or("text")
    }

    /// Numeric conversation id, accepting integers, integral floats and numeric strings.
    #[allow(clippy::cast_possible_truncation)]
    pub fn conversation_id(&self) -> Option<i64> {
        match self.conversation.as_ref()?.id.as_ref()? {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}
