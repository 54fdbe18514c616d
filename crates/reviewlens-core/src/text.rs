//! Review text preparation before it is sent to a provider.

/// Shortest cleaned text worth sending to a provider.
pub const MIN_TEXT_CHARS: usize = 10;

/// Collapse whitespace runs to a single space and trim.
///
/// Returns `None` when fewer than [`MIN_TEXT_CHARS`] characters remain; such
/// reviews are skipped rather than analysed.
pub fn clean_text(raw: &str) -> Option<String> {
    let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.chars().count() < MIN_TEXT_CHARS {
        return None;
    }
    Some(cleaned)
}
