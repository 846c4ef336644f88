//! Chatwoot webhook intake: payload parsing, filtering, routing and HTTP handlers.

mod filter;
mod handler;
mod mode;
mod normalize;
mod payload;

pub use filter::{Eligible, EventFilter, SkipReason};
pub use handler::{AppState, router};
pub use mode::{LEGACY_MODE_ATTR, ModeClassifier, normalize_mode};
pub use normalize::strip_markup;
pub use payload::{INCOMING, InboundEvent, MESSAGE_CREATED, Metadata};
