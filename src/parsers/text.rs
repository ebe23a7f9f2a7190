/// Collapses every whitespace run to a single space and trims the ends.
///
/// This is the canonical form used for length checks, ledger keys and the
/// liveness check on node handles.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Length in Unicode scalar values, not bytes
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Whether a normalized block falls inside the inclusive `[min, max]` length window
pub fn within_bounds(text: &str, min: usize, max: usize) -> bool {
    let len = char_len(text);
    len >= min && len <= max
}
