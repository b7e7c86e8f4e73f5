//! Keyword-anchored section removal.
//!
//! A section starts at a line whose first word is one of a category's
//! keywords and runs until the next heading-like boundary:
//!
//! - a line starting with 3+ uppercase letters/digits followed by whitespace
//!   (configurable through `heading_pattern`),
//! - a line starting with "introduction",
//! - or the end of the text.
//!
//! Each keyword removes at most one section per [`TextCleaner::clean`] call,
//! even though the cleaner runs its passes more than once.
//!
//! [`TextCleaner::clean`]: super::TextCleaner::clean
//!
//! The heading heuristic assumes body sections are introduced by all-caps or
//! digit-led headings. PDFs with mixed-case headings will over-delete.

use super::{compile_pattern, keyword_pattern, CleaningRun, RemovalRule};
use crate::config::SectionCategory;
use crate::error::Result;
use regex::Regex;
use std::ops::Range;

#[derive(Debug)]
struct KeywordAnchor {
    category: String,
    keyword: String,
    key: String,
    pattern: Regex,
}

/// Removes whole sections opened by category keywords.
#[derive(Debug)]
pub struct SectionRemoval {
    anchors: Vec<KeywordAnchor>,
    heading: Regex,
    introduction: Regex,
}

impl SectionRemoval {
    /// Compile anchors for every keyword of every category, preserving order.
    pub fn new(categories: &[SectionCategory], heading_pattern: &str) -> Result<Self> {
        let mut anchors = Vec::new();
        for category in categories {
            for keyword in &category.keywords {
                let source = format!(r"^[ \t]*{}", keyword_pattern(keyword));
                anchors.push(KeywordAnchor {
                    category: category.name.clone(),
                    keyword: keyword.clone(),
                    key: format!("{}/{}", category.name, keyword),
                    pattern: compile_pattern(&category.name, &source, true)?,
                });
            }
        }

        Ok(Self {
            anchors,
            heading: compile_pattern("heading_pattern", heading_pattern, false)?,
            introduction: compile_pattern("introduction", r"^[ \t]*introduction\b", true)?,
        })
    }

    /// Byte range of the section opened by the first line starting with the
    /// anchor's keyword, if any.
    fn section_range(&self, anchor: &KeywordAnchor, text: &str) -> Option<Range<usize>> {
        let found = anchor.pattern.find(text)?;
        let start = found.start();
        let body_start = text[found.end()..]
            .find('\n')
            .map(|i| found.end() + i + 1)
            .unwrap_or(text.len());
        Some(start..self.boundary_after(text, body_start))
    }

    /// Start of the first heading-like line at or after `from`, or the end of the text.
    fn boundary_after(&self, text: &str, from: usize) -> usize {
        if from >= text.len() {
            return text.len();
        }
        let heading = self.heading.find_at(text, from).map(|m| m.start());
        let introduction = self.introduction.find_at(text, from).map(|m| m.start());
        match (heading, introduction) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => text.len(),
        }
    }
}

impl RemovalRule for SectionRemoval {
    fn name(&self) -> &str {
        "sections"
    }

    fn apply(&self, text: &str) -> String {
        self.apply_in(text, &mut CleaningRun::default())
    }

    fn apply_in(&self, text: &str, run: &mut CleaningRun) -> String {
        let mut result = text.to_string();
        for anchor in &self.anchors {
            if run.is_consumed(&anchor.key) {
                continue;
            }
            if let Some(range) = self.section_range(anchor, &result) {
                log::debug!(
                    "removing '{}' section ({}) of {} bytes",
                    anchor.keyword,
                    anchor.category,
                    range.len()
                );
                result.replace_range(range, "");
                run.consume(&anchor.key);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CleaningRuleSet;

    fn sections() -> SectionRemoval {
        let rules = CleaningRuleSet::default();
        SectionRemoval::new(&rules.section_keywords, &rules.heading_pattern).unwrap()
    }

    #[test]
    fn test_references_to_end_of_text() {
        let citations: Vec<String> = (1..=50)
            .map(|i| format!("Author{}, A. ({}). A study of things. Linguistics Review, 4, 1-10.", i, 1990 + i % 30))
            .collect();
        let input = format!(
            "Body paragraph one is retained verbatim.\n\nReferences\n{}",
            citations.join("\n")
        );
        assert_eq!(sections().apply(&input), "Body paragraph one is retained verbatim.\n\n");
    }

    #[test]
    fn test_abstract_stops_at_uppercase_heading() {
        let input = "Abstract\nThis paper studies hedging.\nIt is short.\nINTRODUCTION\nBody text.";
        assert_eq!(sections().apply(input), "INTRODUCTION\nBody text.");
    }

    #[test]
    fn test_abstract_stops_at_introduction_line() {
        let input = "ABSTRACT: We study hedging.\nMore abstract text.\nIntroduction\nBody text.";
        assert_eq!(sections().apply(input), "Introduction\nBody text.");
    }

    #[test]
    fn test_heading_line_itself_is_not_its_own_boundary() {
        let input = "Body.\nACKNOWLEDGMENTS\nWe thank the reviewers.\nREFERENCES\nSmith, J. (2001).";
        assert_eq!(sections().apply(input), "Body.\n");
    }

    #[test]
    fn test_keyword_must_be_whole_word() {
        let input = "Abstraction is a core idea in this field.\nSummarizing results helps readers.";
        assert_eq!(sections().apply(input), input);
    }

    #[test]
    fn test_keyword_must_start_line() {
        let input = "We list the references in the appendix of the book.";
        assert_eq!(sections().apply(input), input);
    }

    #[test]
    fn test_one_removal_per_keyword() {
        let input = "Body one.\nAppendix\nA text\nBODY TWO\nAppendix\nB text";
        assert_eq!(sections().apply(input), "Body one.\nBODY TWO\nAppendix\nB text");
    }

    #[test]
    fn test_one_removal_per_keyword_across_passes() {
        let sections = sections();
        let mut run = CleaningRun::default();
        let input = "Body one.\nAppendix\nA text\nBODY TWO\nAppendix\nB text";
        let first = sections.apply_in(input, &mut run);
        assert_eq!(first, "Body one.\nBODY TWO\nAppendix\nB text");
        assert_eq!(sections.apply_in(&first, &mut run), first);
    }

    #[test]
    fn test_multi_word_keyword_with_flexible_spacing() {
        let input = "Body.\nKey  words: hedging, stance\nMETHODS used here\nText.";
        assert_eq!(sections().apply(input), "Body.\nMETHODS used here\nText.");
    }

    #[test]
    fn test_lowercase_heading_is_not_a_boundary() {
        let input = "Abstract\nsummary text\nmethods follow here\nMETHODS\nBody.";
        assert_eq!(sections().apply(input), "METHODS\nBody.");
    }

    #[test]
    fn test_no_keywords_is_noop() {
        let input = "Plain body text with nothing to remove.\nSecond line.";
        assert_eq!(sections().apply(input), input);
    }
}
