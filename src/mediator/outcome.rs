//! Tagged results of reply-source calls and whole mediations.

use std::fmt;

use crate::error::RelayError;
use crate::webhook::SkipReason;

/// Result of one single-shot reply-source call.
#[derive(Debug)]
pub enum ReplyOutcome {
    Reply(String),
    Empty,
    Failed(RelayError),
}

impl ReplyOutcome {
    /// Blank replies count as [`ReplyOutcome::Empty`].
    pub fn from_result(result: crate::error::Result<String>) -> Self {
        match result {
            Ok(text) if text.trim().is_empty() => ReplyOutcome::Empty,
            Ok(text) => ReplyOutcome::Reply(text),
            Err(e) => ReplyOutcome::Failed(e),
        }
    }
}

/// How a mediation ended. `posted` counts every successful post, placeholder included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediationOutcome {
    /// Event was not eligible; nothing was called.
    Dropped(SkipReason),
    /// Posting sink or reply source unavailable; nothing was called.
    Misconfigured(&'static str),
    /// The reply (or every streamed block) was posted.
    Delivered { posted: usize },
    /// The reply source produced nothing.
    NoReply { posted: usize },
    /// The reply source failed; already posted blocks stay posted.
    SourceFailed { posted: usize },
    /// A post was rejected; remaining blocks were abandoned.
    PostFailed { posted: usize },
}

impl MediationOutcome {
    pub fn posted(&self) -> usize {
        match self {
            MediationOutcome::Dropped(_) | MediationOutcome::Misconfigured(_) => 0,
            MediationOutcome::Delivered { posted }
            | MediationOutcome::NoReply { posted }
            | MediationOutcome::SourceFailed { posted }
            | MediationOutcome::PostFailed { posted } => *posted,
        }
    }
}

impl fmt::Display for MediationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediationOutcome::Dropped(reason) => write!(f, "dropped ({reason})"),
            MediationOutcome::Misconfigured(what) => write!(f, "misconfigured ({what})"),
            MediationOutcome::Delivered { .. } => f.write_str("delivered"),
            MediationOutcome::NoReply { .. } => f.write_str("no reply"),
            MediationOutcome::SourceFailed { .. } => f.write_str("reply source failed"),
            MediationOutcome::PostFailed { .. } => f.write_str("post failed"),
        }
    }
}
