//! Splits a growing reply buffer into chat-sized blocks.

/// Boundary markers, strongest first: paragraph, sentence, sentence at line end, word.
const BOUNDARIES: &[&str] = &["\n\n", ". ", ".\n", " "];

/// Byte offset of the `n`-th character, or the end of the string.
fn byte_offset(text: &str, n: usize) -> usize {
    text.char_indices().nth(n).map_or(text.len(), |(i, _)| i)
}

/// Cuts one block off the front of `buffer`, sized in characters.
///
/// Returns `(block, remainder)`. Below `min_chars` the block is empty and the
/// buffer comes back untouched. Otherwise the cut lands right after the last
/// boundary found between `min_chars` and `max_chars + 1`, trying stronger
/// boundaries first; failing that, at the last space before `max_chars + 1`,
/// or exactly at `max_chars`. The block is trimmed and the remainder loses its
/// leading whitespace only, so text appended later still joins correctly.
pub fn extract_block(buffer: &str, min_chars: usize, max_chars: usize) -> (String, String) {
    let len = buffer.chars().count();
    if len < min_chars {
        return (String::new(), buffer.to_string());
    }

    let start = byte_offset(buffer, min_chars);
    let end = byte_offset(buffer, max_chars.saturating_add(1).min(len));
    let window = buffer.get(start..end.max(start)).unwrap_or_default();

    let cut = BOUNDARIES
        .iter()
        .find_map(|sep| window.rfind(*sep).map(|idx| start + idx + sep.len()))
        .or_else(|| {
            buffer[..end]
                .rfind(' ')
                .filter(|&space| space >= start)
        })
        .unwrap_or_else(|| byte_offset(buffer, max_chars));

    let (block, remainder) = buffer.split_at(cut);
    (block.trim().to_string(), remainder.trim_start().to_string())
}
