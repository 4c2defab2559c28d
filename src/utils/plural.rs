//! Count formatting for log lines.

/// Format a count with its noun, pluralized with `s`.
///
/// `plural_count(1, "tag")` -> `"1 tag"`, `plural_count(3, "tag")` -> `"3 tags"`
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}
