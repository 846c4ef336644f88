//! Decides whether an inbound event should reach the reply source.

use std::fmt;

use regex::Regex;

use super::normalize::strip_markup;
use super::payload::{INCOMING, InboundEvent, MESSAGE_CREATED};

/// Content kinds produced by the widget's pre-chat and CSAT forms.
const CONTACT_CONTENT_KINDS: &[&str] = &["input_email", "input_csat"];

/// Phrases the chat widget posts on its own behalf.
const WIDGET_PHRASES: &[&str] = &[
    "get notified by email",
    "please enter your email",
    "give the team a way to reach you",
];

const EMAIL_ONLY_PATTERN: &str = r"(?i)^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Why an event was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    WrongEvent(String),
    NotIncoming(String),
    EmptyContent,
    ContactInfo,
    SystemPhrase,
    MissingConversation,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::WrongEvent(event) => write!(f, "event {event:?} is not {MESSAGE_CREATED}"),
            SkipReason::NotIncoming(kind) => write!(f, "message type {kind:?} is not {INCOMING}"),
            SkipReason::EmptyContent => f.write_str("empty content"),
            SkipReason::ContactInfo => f.write_str("contact info submission"),
            SkipReason::SystemPhrase => f.write_str("widget system phrase"),
            SkipReason::MissingConversation => f.write_str("no conversation id"),
        }
    }
}

/// Content-based classification rules: contact-info kinds and pattern, widget phrases.
#[derive(Debug, Clone)]
pub struct RuleTable {
    contact_kinds: Vec<String>,
    contact_pattern: Regex,
    system_phrases: Vec<String>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self {
            contact_kinds: CONTACT_CONTENT_KINDS.iter().map(|k| (*k).to_string()).collect(),
            contact_pattern: Regex::new(EMAIL_ONLY_PATTERN).expect("invalid email-only regex"),
            system_phrases: WIDGET_PHRASES.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

impl RuleTable {
    /// True for pre-chat email / CSAT submissions and single-line bare email addresses.
    ///
    /// Multi-line content never counts: a real question may follow the address.
    pub fn is_pure_contact_info(&self, content: &str, content_kind: &str) -> bool {
        let kind = content_kind.trim().to_lowercase();
        if self.contact_kinds.iter().any(|k| *k == kind) {
            return true;
        }
        let line = content.trim();
        if line.is_empty() || line.contains('\n') {
            return false;
        }
        self.contact_pattern.is_match(line)
    }

    /// True for blank content and exact (case-insensitive) widget phrases.
    ///
    /// Content spanning several lines is never treated as a widget phrase.
    pub fn is_system_phrase(&self, content: &str) -> bool {
        let line = content.trim();
        if line.is_empty() {
            return true;
        }
        if line.contains('\n') {
            return false;
        }
        let line = line.to_lowercase();
        self.system_phrases.iter().any(|p| *p == line)
    }
}

/// An event that passed the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eligible {
    pub conversation_id: i64,
    /// Markup-free content handed to the reply source.
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    rules: RuleTable,
}

impl EventFilter {
    /// Runs every content-level check in order and returns the normalized content.
    pub fn check(&self, event: &InboundEvent) -> Result<Eligible, SkipReason> {
        if event.event_kind() != MESSAGE_CREATED {
            return Err(SkipReason::WrongEvent(event.event_kind().to_string()));
        }
        if event.message_kind() != INCOMING {
            return Err(SkipReason::NotIncoming(event.message_kind().to_string()));
        }
        let conversation_id = event
            .conversation_id()
            .ok_or(SkipReason::MissingConversation)?;

        let content = strip_markup(event.raw_content().trim());
        if content.is_empty() {
            return Err(SkipReason::EmptyContent);
        }
        if self.rules.is_pure_contact_info(&content, event.content_kind()) {
            return Err(SkipReason::ContactInfo);
        }
        if self.rules.is_system_phrase(&content) {
            return Err(SkipReason::SystemPhrase);
        }

        Ok(Eligible {
            conversation_id,
            content,
        })
    }
}
