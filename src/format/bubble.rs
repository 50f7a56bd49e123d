//! Speech-bubble message frames.
//!
//! Every chat line is stored in the room as a bordered, word-wrapped frame:
//!
//! ```text
//! --------------------------------------------------
//! | alice: hello there                             |
//! --------------------------------------------------
//! ```

use crate::format::unicode::{grapheme_count, split_graphemes};

/// Outer width of a frame, borders included.
pub const OUTER_WIDTH: usize = 50;

/// Maximum width of the wrapped text inside a frame.
pub const INNER_WIDTH: usize = 45;

/// Text column width between `"| "` and `" |"`.
const TEXT_COLUMN: usize = OUTER_WIDTH - 4;

/// Formats one chat line as a message frame.
///
/// The first body line starts with `"<username>: "`. Whitespace in `text`
/// is collapsed; words wider than [`INNER_WIDTH`] are split. The frame ends
/// with a newline so frames concatenate line by line.
///
/// # Examples
///
/// ```
/// use roomchat::format::{OUTER_WIDTH, format_message};
///
/// let frame = format_message("alice", "hi");
/// let lines: Vec<&str> = frame.lines().collect();
/// assert_eq!(lines.len(), 3);
/// assert!(lines[1].starts_with("| alice: hi"));
/// assert_eq!(lines[1].chars().count(), OUTER_WIDTH);
/// ```
#[must_use]
pub fn format_message(username: &str, text: &str) -> String {
    let label = format!("{username}:");
    let words = std::iter::once(label.as_str()).chain(text.split_whitespace());
    let lines = wrap_words(words, INNER_WIDTH);

    let border = "-".repeat(OUTER_WIDTH);
    let mut frame = String::with_capacity((OUTER_WIDTH + 1) * (lines.len() + 2));
    frame.push_str(&border);
    frame.push('\n');
    for line in &lines {
        let pad = TEXT_COLUMN.saturating_sub(grapheme_count(line));
        frame.push_str("| ");
        frame.push_str(line);
        frame.push_str(&" ".repeat(pad));
        frame.push_str(" |\n");
    }
    frame.push_str(&border);
    frame.push('\n');
    frame
}

/// Greedy word wrap counting grapheme clusters.
fn wrap_words<'a>(words: impl Iterator<Item = &'a str>, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in words {
        for piece in split_graphemes(word, width) {
            let piece_width = grapheme_count(piece);
            if current.is_empty() {
                current.push_str(piece);
                current_width = piece_width;
            } else if current_width + 1 + piece_width <= width {
                current.push(' ');
                current.push_str(piece);
                current_width += 1 + piece_width;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(piece);
                current_width = piece_width;
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn body_lines(frame: &str) -> Vec<&str> {
        let lines: Vec<&str> = frame.lines().collect();
        lines[1..lines.len() - 1].to_vec()
    }

    #[test_case("hi" ; "short")]
    #[test_case("the quick brown fox jumps over the lazy dog and keeps running far away" ; "wrapped")]
    #[test_case("supercalifragilisticexpialidocious-and-then-some-more-letters-here" ; "long word")]
    #[test_case("héllo wörld ünïcödé" ; "accents")]
    fn test_every_line_has_outer_width(text: &str) {
        let frame = format_message("alice", text);
        for line in frame.lines() {
            assert_eq!(grapheme_count(line), OUTER_WIDTH, "line: {line:?}");
        }
    }

    #[test]
    fn test_frame_shape() {
        let frame = format_message("A", "hi");
        let border = "-".repeat(OUTER_WIDTH);
        let lines: Vec<&str> = frame.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], border);
        assert_eq!(lines[2], border);
        assert!(lines[1].starts_with("| A: hi "));
        assert!(lines[1].ends_with(" |"));
        assert!(frame.ends_with('\n'));
    }

    #[test]
    fn test_wraps_at_inner_width() {
        let text = "word ".repeat(30);
        let frame = format_message("bob", &text);
        let body = body_lines(&frame);
        assert!(body.len() > 1);
        for line in body {
            let inner = line.trim_start_matches("| ").trim_end_matches(" |").trim_end();
            assert!(grapheme_count(inner) <= INNER_WIDTH);
        }
    }

    #[test]
    fn test_long_word_is_split() {
        let word = "x".repeat(INNER_WIDTH * 2 + 3);
        let frame = format_message("bob", &word);
        let body = body_lines(&frame);
        assert_eq!(body.len(), 4);
        assert!(body[0].starts_with("| bob: "));
    }

    #[test]
    fn test_empty_text() {
        let frame = format_message("bob", "   ");
        let body = body_lines(&frame);
        assert_eq!(body.len(), 1);
        assert!(body[0].starts_with("| bob: "));
    }

    #[test]
    fn test_whitespace_collapsed() {
        let frame = format_message("bob", "a \t  b\nc");
        assert!(frame.contains("| bob: a b c "));
    }
}
