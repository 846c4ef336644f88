//! Routing mode selection from conversation and contact attributes.

use crate::types::RoutingMode;

use super::payload::Metadata;

/// Attribute older widget forms used instead of the configured key.
pub const LEGACY_MODE_ATTR: &str = "preferred_channel";

const BOT_TOKENS: &[&str] = &["bot", "ai", "agent"];
const HUMAN_TOKENS: &[&str] = &["human", "человек", "operator", "оператор"];

/// Maps conversation/contact metadata to a [`RoutingMode`].
#[derive(Debug, Clone)]
pub struct ModeClassifier {
    attribute: String,
}

impl ModeClassifier {
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
        }
    }

    /// Conversation attributes win over contact attributes; within each, the
    /// configured key wins over the legacy one. No value means [`RoutingMode::Human`].
    pub fn classify(
        &self,
        conversation: Option<&Metadata>,
        contact: Option<&Metadata>,
    ) -> RoutingMode {
        [conversation, contact]
            .into_iter()
            .flatten()
            .find_map(|meta| {
                meta.attribute(&self.attribute)
                    .or_else(|| meta.attribute(LEGACY_MODE_ATTR))
            })
            .map_or(RoutingMode::Human, |raw| normalize_mode(&raw))
    }
}

/// Maps a raw attribute value such as `bot`, `AI агент` or `Человек` to a mode.
pub fn normalize_mode(value: &str) -> RoutingMode {
    let value = value.trim().to_lowercase();
    match value.as_str() {
        "bot" => return RoutingMode::Bot,
        "human" => return RoutingMode::Human,
        _ => {}
    }
    if BOT_TOKENS.iter().any(|token| value.contains(token)) {
        return RoutingMode::Bot;
    }
    if HUMAN_TOKENS.iter().any(|token| value.contains(token)) {
        return RoutingMode::Human;
    }
    RoutingMode::Human
}
