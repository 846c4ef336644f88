//! Markup stripping for inbound message content.

use std::sync::LazyLock;

use regex::Regex;

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("invalid markup tag regex"));

/// Replaces every markup tag with a single space and trims the result.
pub fn strip_markup(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    MARKUP_TAG.replace_all(text, " ").trim().to_string()
}
