//! Reply source interfaces and the startup-time provider registry.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::{RelayError, Result};

/// Incremental reply text; finite, single pass.
pub type ReplyStream = BoxStream<'static, Result<String>>;

/// Produces a complete reply in one call. An empty string means "no answer".
#[async_trait]
pub trait ReplySource: Send + Sync {
    async fn reply(&self, content: &str) -> Result<String>;
}

/// Produces a reply as a stream of text deltas.
#[async_trait]
pub trait StreamReplySource: Send + Sync {
    async fn stream_reply(&self, content: &str) -> Result<ReplyStream>;
}

/// Reply providers active for this process.
///
/// Each slot accepts exactly one registration; the registry is filled during
/// startup and only read afterwards.
#[derive(Default)]
pub struct ReplyProviders {
    single: OnceLock<Arc<dyn ReplySource>>,
    stream: OnceLock<Arc<dyn StreamReplySource>>,
}

impl ReplyProviders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_reply(&self, source: Arc<dyn ReplySource>) -> Result<()> {
        self.single
            .set(source)
            .map_err(|_| RelayError::AlreadyRegistered("single-shot"))
    }

    pub fn register_stream(&self, source: Arc<dyn StreamReplySource>) -> Result<()> {
        self.stream
            .set(source)
            .map_err(|_| RelayError::AlreadyRegistered("streaming"))
    }

    pub fn reply_source(&self) -> Option<&Arc<dyn ReplySource>> {
        self.single.get()
    }

    pub fn stream_source(&self) -> Option<&Arc<dyn StreamReplySource>> {
        self.stream.get()
    }
}
