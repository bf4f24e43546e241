//! Source line cleaning.

/// Character that starts a comment running to the end of the line.
pub const COMMENT_START: char = '#';

/// Split off a trailing comment.
///
/// Returns the code part of the line and whether a comment was present.
pub fn strip_comment(line: &str) -> (&str, bool) {
    match line.split_once(COMMENT_START) {
        Some((code, _)) => (code, true),
        None => (line, false),
    }
}

/// Strip comments and surrounding whitespace.
pub fn clean_line(line: &str) -> &str {
    strip_comment(line).0.trim()
}
