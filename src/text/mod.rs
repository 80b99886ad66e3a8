//! Text normalisation
//!
//! Whitespace condensing, control-character stripping and the segment join
//! shared by the primary and fallback text paths.

pub mod resolver;

pub use resolver::{resolve_annotated_text, FallbackPolicy, TextChoice};

use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of whitespace, newlines included
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\n\s]+").unwrap_or_else(|e| panic!("Invalid whitespace regex: {e}"))
});

/// Collapse whitespace runs to one space and trim both ends
///
/// Idempotent: condensing condensed text is a no-op.
pub fn condense_spaces(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Remove control characters and U+FFFD
pub fn strip_control(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() && *c != char::REPLACEMENT_CHARACTER)
        .collect()
}

/// Concatenate segments, inserting one space at each boundary unless
/// `has_boundary(previous)` says whitespace is already there
///
/// Empty segments are skipped.
pub fn join_segments<I, S, F>(segments: I, has_boundary: F) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: Fn(&str) -> bool,
{
    let mut joined = String::new();
    for segment in segments {
        let segment = segment.as_ref();
        if segment.is_empty() {
            continue;
        }
        if !joined.is_empty() && !has_boundary(&joined) {
            joined.push(' ');
        }
        joined.push_str(segment);
    }
    joined
}

/// Default boundary test: the text so far ends in whitespace
pub fn ends_with_whitespace(text: &str) -> bool {
    text.chars().next_back().is_some_and(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condense_spaces() {
        assert_eq!(condense_spaces("  hello \n\n  world\t "), "hello world");
        assert_eq!(condense_spaces(""), "");
        assert_eq!(condense_spaces("\n\n"), "");
    }

    #[test]
    fn test_condense_is_idempotent() {
        for input in ["a  b", " lead", "trail\n", "x\r\n\ty  z", "already clean", "\u{a0}nbsp\u{a0}"] {
            let once = condense_spaces(input);
            assert_eq!(condense_spaces(&once), once);
        }
    }

    #[test]
    fn test_strip_control() {
        assert_eq!(strip_control("a\u{0}b\u{7}c\u{fffd}d"), "abcd");
        assert_eq!(strip_control("line\nbreak"), "linebreak");
        assert_eq!(strip_control("café ✓"), "café ✓");
    }

    #[test]
    fn test_join_segments_smart_spacing() {
        assert_eq!(join_segments(["hello", "world"], ends_with_whitespace), "hello world");
        assert_eq!(join_segments(["hello ", "world"], ends_with_whitespace), "hello world");
        assert_eq!(join_segments(["", "a", "", "b"], ends_with_whitespace), "a b");
        assert_eq!(join_segments(Vec::<String>::new(), ends_with_whitespace), "");
    }

    #[test]
    fn test_join_segments_custom_boundary() {
        let joined = join_segments(["ab", "cd"], |_: &str| true);
        assert_eq!(joined, "abcd");
    }
}
