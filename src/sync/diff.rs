//! Diff engine: what part of a room a session has not seen yet.
//!
//! Two flavours exist. [`diff_since`] tracks a byte cursor into the
//! append-only content and is what the watcher uses. [`compute_diff`] keeps
//! the string-subtraction semantics for comparing two snapshots when no
//! cursor is available.

/// Unseen room content starting at byte offset `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diff<'a> {
    /// Byte offset of `text` within the room content.
    pub start: usize,
    /// The unseen content.
    pub text: &'a str,
}

impl Diff<'_> {
    /// Byte offset right after this diff; the next cursor.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Returns the content beyond `cursor`, or `None` if there is nothing new.
///
/// A cursor past the end of the content or inside a UTF-8 sequence cannot
/// come from an append-only log; the diff then resyncs from offset 0.
///
/// # Examples
///
/// ```
/// use roomchat::sync::diff_since;
///
/// let diff = diff_since("hello world", 5).unwrap();
/// assert_eq!(diff.text, " world");
/// assert_eq!(diff.end(), 11);
/// assert!(diff_since("hello", 5).is_none());
/// ```
#[must_use]
pub fn diff_since(current: &str, cursor: usize) -> Option<Diff<'_>> {
    let diff = match current.get(cursor..) {
        Some(text) => Diff {
            start: cursor,
            text,
        },
        None => {
            tracing::warn!(
                cursor,
                size = current.len(),
                "cursor does not fit room content, resyncing"
            );
            Diff {
                start: 0,
                text: current,
            }
        }
    };

    (!diff.text.is_empty()).then_some(diff)
}

/// Subtracts a known snapshot from the current one.
///
/// If `known` is a prefix of `current`, the prefix is removed once.
/// Otherwise the first textual occurrence of `known` is removed, which can
/// mis-align when the content repeats itself. If `known` does not occur at
/// all, `current` is returned whole.
///
/// # Examples
///
/// ```
/// use roomchat::sync::compute_diff;
///
/// assert_eq!(compute_diff("ab", "ab"), "");
/// assert_eq!(compute_diff("abcd", "ab"), "cd");
/// assert_eq!(compute_diff("xaby", "ab"), "xy");
/// ```
#[must_use]
pub fn compute_diff(current: &str, known: &str) -> String {
    if let Some(rest) = current.strip_prefix(known) {
        return rest.to_string();
    }
    current.replacen(known, "", 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_diff_since_start() {
        let diff = diff_since("abc", 0).unwrap();
        assert_eq!(diff.start, 0);
        assert_eq!(diff.text, "abc");
        assert_eq!(diff.end(), 3);
    }

    #[test]
    fn test_diff_since_nothing_new() {
        assert!(diff_since("", 0).is_none());
        assert!(diff_since("abc", 3).is_none());
    }

    #[test]
    fn test_diff_since_cursor_past_end_resyncs() {
        let diff = diff_since("abc", 10).unwrap();
        assert_eq!(diff.start, 0);
        assert_eq!(diff.text, "abc");
        assert_eq!(diff.end(), 3);
    }

    #[test]
    fn test_diff_since_cursor_inside_code_point_resyncs() {
        let content = "é!";
        let diff = diff_since(content, 1).unwrap();
        assert_eq!(diff.start, 0);
        assert_eq!(diff.text, content);
    }

    #[test]
    fn test_compute_diff_prefix() {
        assert_eq!(compute_diff("msg1msg2", "msg1"), "msg2");
    }

    #[test]
    fn test_compute_diff_empty_known() {
        assert_eq!(compute_diff("abc", ""), "abc");
    }

    #[test]
    fn test_compute_diff_not_prefix() {
        // Interleaved writer: known sits in the middle
        assert_eq!(compute_diff("B1A1A2", "A1"), "B1A2");
        assert_eq!(compute_diff("xyz", "abc"), "xyz");
    }

    #[test]
    fn test_compute_diff_repeated_payload_strips_prefix_once() {
        assert_eq!(compute_diff("hihi", "hi"), "hi");
    }

    proptest! {
        #[test]
        fn compute_diff_idempotent(x in ".{0,64}") {
            prop_assert_eq!(compute_diff(&x, &x), "");
        }

        #[test]
        fn compute_diff_disjoint_append(a in ".{0,64}", b in ".{0,64}") {
            let current = format!("{a}{b}");
            prop_assert_eq!(compute_diff(&current, &a), b);
        }

        #[test]
        fn diff_since_matches_suffix(a in ".{0,64}", b in ".{0,64}") {
            let current = format!("{a}{b}");
            let diff = diff_since(&current, a.len());
            if b.is_empty() {
                prop_assert!(diff.is_none());
            } else {
                let diff = diff.unwrap();
                prop_assert_eq!(diff.start, a.len());
                prop_assert_eq!(diff.text, b.as_str());
                prop_assert_eq!(diff.end(), current.len());
            }
        }

        #[test]
        fn diff_since_at_end_is_empty(x in ".{0,64}") {
            prop_assert!(diff_since(&x, x.len()).is_none());
        }
    }
}
