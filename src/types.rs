//! Common types shared by the webhook, mediator and Chatwoot client.

use strum::Display;

/// How replies for a conversation are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum RoutingMode {
    /// Automated reply posted publicly to the customer
    Bot,
    /// Private suggestion for the human operator
    #[default]
    Human,
}

/// Who can see a posted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Visibility {
    /// Visible to the customer
    Public,
    /// Private note, visible to agents only
    Private,
}

impl Visibility {
    pub fn is_private(self) -> bool {
        matches!(self, Visibility::Private)
    }
}

impl From<RoutingMode> for Visibility {
    fn from(mode: RoutingMode) -> Self {
        match mode {
            RoutingMode::Bot => Visibility::Public,
            RoutingMode::Human => Visibility::Private,
        }
    }
}

/// A message ready to be handed to the posting sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyDestination {
    pub conversation_id: i64,
    pub content: String,
    pub visibility: Visibility,
}

impl ReplyDestination {
    pub fn new(conversation_id: i64, content: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            conversation_id,
            content: content.into(),
            visibility,
        }
    }
}
