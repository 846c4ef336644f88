//! Removes templated closing filler before a trailing sources section.

/// Headings that open the citation list at the end of a reply.
const SOURCES_MARKERS: &[&str] = &["Источники:", "Источник:", "Sources:", "Source:"];

/// Openers of boilerplate wrap-up paragraphs.
const FILLER_STARTS: &[&str] = &[
    "Таким образом",
    "Теперь вы можете",
    "Дополнительную информацию",
    "После этого",
    "Вы также можете",
    "Therefore",
    "Thus",
    "Now you can",
    "For more information",
    "After that",
    "You can also",
];

/// Byte position of the earliest sources marker, if any.
fn find_sources_marker(text: &str) -> Option<usize> {
    SOURCES_MARKERS.iter().filter_map(|m| text.find(*m)).min()
}

/// True when `text` contains a sources section heading.
pub fn has_sources_marker(text: &str) -> bool {
    find_sources_marker(text).is_some()
}

/// Drops trailing filler paragraphs that sit right before the sources section.
///
/// Text without a sources section is returned unchanged. Applying it twice
/// gives the same result as applying it once.
pub fn sanitize(reply: &str) -> String {
    let Some(split) = find_sources_marker(reply) else {
        return reply.to_string();
    };
    let (body, sources) = reply.split_at(split);

    let mut paragraphs: Vec<&str> = body
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    while paragraphs
        .last()
        .is_some_and(|last| FILLER_STARTS.iter().any(|f| last.starts_with(*f)))
    {
        paragraphs.pop();
    }

    format!("{}\n\n{}", paragraphs.join("\n\n"), sources.trim())
        .trim()
        .to_string()
}
