//! Accumulates streamed reply text and releases it as postable blocks.

use crate::config::StreamLimits;

use super::sanitizer::{has_sources_marker, sanitize};
use super::segmenter::extract_block;

/// Text of one in-flight streamed reply.
///
/// Once a sources section shows up, nothing more is released until
/// [`StreamBuffer::finish`], so citations are posted together.
#[derive(Debug)]
pub struct StreamBuffer {
    text: String,
    limits: StreamLimits,
    holding: bool,
}

impl StreamBuffer {
    pub fn new(limits: StreamLimits) -> Self {
        Self {
            text: String::new(),
            limits,
            holding: false,
        }
    }

    /// Appends a delta and returns every block that is ready, in order.
    pub fn push(&mut self, delta: &str) -> Vec<String> {
        self.text.push_str(delta);
        if !self.holding && has_sources_marker(&self.text) {
            self.holding = true;
        }
        if self.holding {
            return Vec::new();
        }

        let mut blocks = Vec::new();
        while self.text.chars().count() >= self.limits.min_chars {
            let (block, rest) =
                extract_block(&self.text, self.limits.min_chars, self.limits.max_chars);
            let progressed = rest.len() < self.text.len();
            self.text = rest;
            if !block.is_empty() {
                blocks.push(block);
            }
            if !progressed {
                break;
            }
        }
        blocks
    }

    /// Final block: whatever is left, sanitized when it carries sources.
    pub fn finish(self) -> Option<String> {
        let rest = self.text.trim();
        if rest.is_empty() {
            return None;
        }
        if has_sources_marker(rest) {
            Some(sanitize(rest))
        } else {
            Some(rest.to_string())
        }
    }
}
