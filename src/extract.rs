//! PDF text extraction.
//!
//! The cleaner only needs a flat string per document with a sentinel between
//! pages, so extraction sits behind the [`TextExtractor`] trait. The default
//! implementation uses `lopdf`.

use crate::cleaning::panic_message;
use crate::config::{CleaningRuleSet, PAGE_BREAK_MARKER};
use crate::error::{Error, Result};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Source of raw document text.
pub trait TextExtractor {
    /// Extract the full text of `path`, pages separated by the page-break sentinel.
    fn extract(&self, path: &Path) -> Result<String>;
}

impl<T: TextExtractor + ?Sized> TextExtractor for &T {
    fn extract(&self, path: &Path) -> Result<String> {
        (**self).extract(path)
    }
}

/// Append one page's text followed by the page-break sentinel.
fn push_page(text: &mut String, page: &str, marker: &str) {
    text.push_str(page);
    text.push_str("\n\n");
    text.push_str(marker);
    text.push_str("\n\n");
}

/// Join per-page texts the way every extractor must.
///
/// # Examples
///
/// ```
/// use pdf_article_cleaner::extract::join_pages;
///
/// let text = join_pages(&["one", "two"], "---PAGE_BREAK---");
/// assert_eq!(text, "one\n\n---PAGE_BREAK---\n\ntwo\n\n---PAGE_BREAK---\n\n");
/// ```
pub fn join_pages<S: AsRef<str>>(pages: &[S], marker: &str) -> String {
    let mut text = String::new();
    for page in pages {
        push_page(&mut text, page.as_ref(), marker);
    }
    text
}

/// Text extractor backed by `lopdf`.
#[derive(Debug, Clone)]
pub struct LopdfExtractor {
    page_break_marker: String,
}

impl Default for LopdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LopdfExtractor {
    /// Create an extractor using the standard page-break sentinel.
    pub fn new() -> Self {
        Self {
            page_break_marker: PAGE_BREAK_MARKER.to_string(),
        }
    }

    /// Use a custom page-break sentinel.
    pub fn with_page_break_marker(mut self, marker: impl Into<String>) -> Self {
        self.page_break_marker = marker.into();
        self
    }

    /// Create an extractor emitting the sentinel the rule set's line filter drops.
    pub fn from_rules(rules: &CleaningRuleSet) -> Self {
        Self::new().with_page_break_marker(rules.page_break_marker.clone())
    }

    fn extract_pages(&self, path: &Path) -> Result<String> {
        let failure = |reason: String| Error::Extraction {
            path: path.to_path_buf(),
            reason,
        };

        let doc = lopdf::Document::load(path).map_err(|e| failure(e.to_string()))?;
        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(failure("document has no pages".to_string()));
        }

        let mut page_texts = Vec::with_capacity(pages.len());
        let mut failed_pages = 0usize;
        for &page_number in pages.keys() {
            match doc.extract_text(&[page_number]) {
                Ok(page_text) => page_texts.push(page_text),
                Err(e) => {
                    log::warn!("{}: page {} unreadable: {}", path.display(), page_number, e);
                    failed_pages += 1;
                    page_texts.push(String::new());
                },
            }
        }

        if failed_pages == pages.len() {
            return Err(failure(format!("none of {} page(s) could be read", pages.len())));
        }

        let text = join_pages(&page_texts, &self.page_break_marker);

        log::debug!(
            "{}: extracted {} chars from {} page(s)",
            path.display(),
            text.len(),
            pages.len()
        );
        Ok(text)
    }
}

impl TextExtractor for LopdfExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        // lopdf can panic on malformed object streams; keep that inside the file boundary.
        panic::catch_unwind(AssertUnwindSafe(|| self.extract_pages(path))).unwrap_or_else(
            |payload| {
                Err(Error::Extraction {
                    path: path.to_path_buf(),
                    reason: format!("PDF backend panicked: {}", panic_message(payload.as_ref())),
                })
            },
        )
    }
}
