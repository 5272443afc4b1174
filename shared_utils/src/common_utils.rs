//! Common Utilities Module
//!
//! String helpers for log output.

/// Keep the first `max_chars` characters of `s`, appending `...` when anything was cut.
///
/// Counts chars, not bytes, so multi-byte text is never split.
///
/// # Examples
/// ```
/// use shared_utils::common_utils::truncate_preview;
///
/// assert_eq!(truncate_preview("Hello, World!", 5), "Hello...");
/// assert_eq!(truncate_preview("Short", 10), "Short");
/// ```
pub fn truncate_preview(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_string(),
    }
}
