//! Recording fakes for the posting sink and reply sources.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use futures::stream;

use crate::chatwoot::PostingSink;
use crate::error::{RelayError, Result};
use crate::reply::{ReplySource, ReplyStream, StreamReplySource};
use crate::types::ReplyDestination;

pub struct RecordingSink {
    configured: bool,
    /// Posts beyond this many are rejected.
    accept: usize,
    posts: Mutex<Vec<ReplyDestination>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            configured: true,
            accept: usize::MAX,
            posts: Mutex::new(Vec::new()),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn accepting(accept: usize) -> Self {
        Self {
            accept,
            ..Self::new()
        }
    }

    pub fn posts(&self) -> Vec<ReplyDestination> {
        self.posts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PostingSink for RecordingSink {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn post_message(&self, destination: &ReplyDestination) -> bool {
        let mut posts = self.posts.lock().unwrap_or_else(PoisonError::into_inner);
        if posts.len() >= self.accept {
            return false;
        }
        posts.push(destination.clone());
        true
    }
}

/// Single-shot source returning a fixed answer, or failing when `None`.
pub struct FixedReply {
    answer: Option<String>,
    calls: AtomicUsize,
}

impl FixedReply {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReplySource for FixedReply {
    async fn reply(&self, _content: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
            .clone()
            .ok_or_else(|| RelayError::CompletionResponse("fake failure".to_string()))
    }
}

/// Streaming source yielding fixed chunks, optionally failing after `fail_after` of them.
pub struct ChunkedReply {
    chunks: Vec<String>,
    fail_after: Option<usize>,
}

impl ChunkedReply {
    pub fn new(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| (*c).to_string()).collect(),
            fail_after: None,
        }
    }

    pub fn failing_after(chunks: &[&str], fail_after: usize) -> Self {
        Self {
            fail_after: Some(fail_after),
            ..Self::new(chunks)
        }
    }
}

#[async_trait]
impl StreamReplySource for ChunkedReply {
    async fn stream_reply(&self, _content: &str) -> Result<ReplyStream> {
        let mut items: Vec<Result<String>> = self.chunks.iter().cloned().map(Ok).collect();
        if let Some(n) = self.fail_after {
            items.truncate(n);
            items.push(Err(RelayError::Stream("fake stream failure".to_string())));
        }
        Ok(Box::pin(stream::iter(items)))
    }
}
