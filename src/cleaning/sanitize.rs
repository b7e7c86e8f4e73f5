//! Removal of characters that WordprocessingML cannot store.
//!
//! XML 1.0 forbids C0 control characters other than tab, newline and carriage
//! return, and the non-characters U+FFFE/U+FFFF.

/// Whether `c` may appear in the output document.
pub fn is_allowed(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' => true,
        '\u{FFFE}' | '\u{FFFF}' => false,
        c => c >= '\u{20}',
    }
}

/// Strip every character [`is_allowed`] rejects.
///
/// # Examples
///
/// ```
/// use pdf_article_cleaner::cleaning::sanitize;
///
/// assert_eq!(sanitize("a\u{0}b\u{1b}c\td"), "abc\td");
/// ```
pub fn sanitize(text: &str) -> String {
    if text.chars().all(is_allowed) {
        return text.to_string();
    }
    text.chars().filter(|&c| is_allowed(c)).collect()
}
