//! Unicode utilities for frame layout.
//!
//! Widths in a message frame are counted in grapheme clusters so accented
//! and combined characters do not break the border alignment.

use unicode_segmentation::UnicodeSegmentation;

/// Counts grapheme clusters in a string.
///
/// # Examples
///
/// ```
/// use roomchat::format::unicode::grapheme_count;
///
/// assert_eq!(grapheme_count("Hello"), 5);
/// assert_eq!(grapheme_count("世界"), 2);
/// ```
#[must_use]
pub fn grapheme_count(s: &str) -> usize {
    s.graphemes(true).count()
}

/// Truncates a string at a grapheme cluster boundary.
///
/// Returns a slice containing at most `max_graphemes` grapheme clusters.
#[must_use]
pub fn truncate_graphemes(s: &str, max_graphemes: usize) -> &str {
    let mut end_byte = 0;

    for (count, grapheme) in s.graphemes(true).enumerate() {
        if count >= max_graphemes {
            break;
        }
        end_byte += grapheme.len();
    }

    &s[..end_byte]
}

/// Splits a string into pieces of at most `width` grapheme clusters.
///
/// A zero width yields the whole string as a single piece.
#[must_use]
pub fn split_graphemes(s: &str, width: usize) -> Vec<&str> {
    if width == 0 || s.is_empty() {
        return vec![s];
    }

    let mut pieces = Vec::new();
    let mut rest = s;
    while !rest.is_empty() {
        let head = truncate_graphemes(rest, width);
        pieces.push(head);
        rest = &rest[head.len()..];
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grapheme_count() {
        assert_eq!(grapheme_count(""), 0);
        assert_eq!(grapheme_count("héllo"), 5);
        // e + combining acute accent is one cluster
        assert_eq!(grapheme_count("e\u{301}"), 1);
    }

    #[test]
    fn test_truncate_graphemes() {
        assert_eq!(truncate_graphemes("Hello", 3), "Hel");
        assert_eq!(truncate_graphemes("Hello", 10), "Hello");
        assert_eq!(truncate_graphemes("世界你好", 2), "世界");
        assert_eq!(truncate_graphemes("abc", 0), "");
    }

    #[test]
    fn test_split_graphemes() {
        assert_eq!(split_graphemes("abcdefg", 3), vec!["abc", "def", "g"]);
        assert_eq!(split_graphemes("ab", 3), vec!["ab"]);
        assert_eq!(split_graphemes("世界你好", 3), vec!["世界你", "好"]);
        assert_eq!(split_graphemes("abc", 0), vec!["abc"]);
    }
}
