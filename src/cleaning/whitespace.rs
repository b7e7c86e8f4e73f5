//! Whitespace normalization for cleaned article text.
//!
//! Removal passes leave behind runs of blank lines and doubled spaces; this
//! module collapses them so paragraphs are separated by at most two blank lines
//! and words by a single space.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for 4+ consecutive newlines
    static ref RE_MULTI_NEWLINE: Regex = Regex::new(r"\n{4,}").unwrap();

    /// Regex for runs of 2+ spaces or tabs
    static ref RE_MULTI_SPACE: Regex = Regex::new(r"[ \t]{2,}").unwrap();
}

/// Collapse 4+ consecutive newlines to exactly two.
///
/// # Examples
///
/// ```
/// use pdf_article_cleaner::cleaning::whitespace::collapse_blank_lines;
///
/// assert_eq!(collapse_blank_lines("Line 1\n\n\n\n\n\nLine 2"), "Line 1\n\nLine 2");
/// assert_eq!(collapse_blank_lines("Line 1\n\n\nLine 2"), "Line 1\n\n\nLine 2");
/// ```
pub fn collapse_blank_lines(text: &str) -> String {
    RE_MULTI_NEWLINE.replace_all(text, "\n\n").into_owned()
}

/// Collapse runs of spaces and tabs to a single space.
///
/// # Examples
///
/// ```
/// use pdf_article_cleaner::cleaning::whitespace::collapse_spaces;
///
/// assert_eq!(collapse_spaces("The  quick \t brown\tfox"), "The quick brown\tfox");
/// ```
pub fn collapse_spaces(text: &str) -> String {
    RE_MULTI_SPACE.replace_all(text, " ").into_owned()
}

/// Apply the full normalization: blank lines, then spaces, then trim.
///
/// # Examples
///
/// ```
/// use pdf_article_cleaner::cleaning::normalize_whitespace;
///
/// let input = "\n\n  The  quick  brown  fox\n\n\n\n\njumps  over  ";
/// assert_eq!(normalize_whitespace(input), "The quick brown fox\n\njumps over");
/// ```
pub fn normalize_whitespace(text: &str) -> String {
    let collapsed = collapse_spaces(&collapse_blank_lines(text));
    collapsed.trim().to_string()
}
