//! Reply text handling: stream segmentation, sanitizing and reply sources.

mod buffer;
mod sanitizer;
mod segmenter;
mod source;

pub use buffer::StreamBuffer;
pub use sanitizer::{has_sources_marker, sanitize};
pub use segmenter::extract_block;
pub use source::{ReplyProviders, ReplySource, ReplyStream, StreamReplySource};
