//! Local basename validation: a cache filename must be one plain path segment.

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Returns true if `name` is usable as-is as a file name directly under the
/// cache directory: non-empty, at most 255 bytes, no separators, NUL,
/// control characters or whitespace, not `.`/`..`, and no leading dot
/// (leading dots are reserved for in-flight temp files).
pub fn is_safe_basename(name: &str) -> bool {
    if name.is_empty() || name.len() > NAME_MAX {
        return false;
    }
    if name.starts_with('.') || name.ends_with('.') {
        return false;
    }
    !name
        .chars()
        .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_control() || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_script_names() {
        assert!(is_safe_basename("analytics.js"));
        assert!(is_safe_basename("ga.js"));
        assert!(is_safe_basename("gtag-v2_min.js"));
    }

    #[test]
    fn rejects_traversal_and_separators() {
        assert!(!is_safe_basename(".."));
        assert!(!is_safe_basename("."));
        assert!(!is_safe_basename("../ga.js"));
        assert!(!is_safe_basename("sub/ga.js"));
        assert!(!is_safe_basename("sub\\ga.js"));
    }

    #[test]
    fn rejects_hidden_empty_and_control() {
        assert!(!is_safe_basename(""));
        assert!(!is_safe_basename(".ga.js"));
        assert!(!is_safe_basename("ga.js."));
        assert!(!is_safe_basename("ga\0.js"));
        assert!(!is_safe_basename("ga .js"));
    }

    #[test]
    fn rejects_overlong() {
        let long = "a".repeat(256);
        assert!(!is_safe_basename(&long));
        assert!(is_safe_basename(&long[..255]));
    }
}
