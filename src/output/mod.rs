// Output formatting: terminal display of classification results.

pub mod terminal;

/// One-line preview of an input text for result headings.
///
/// Whitespace runs (including newlines in multi-line comments) collapse to a
/// single space, and the result is cut at `max_chars` characters with "..."
/// appended.
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}
