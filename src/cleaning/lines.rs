//! Line-level filtering of running headers, footers and page artifacts.

use super::{compile_pattern, keyword_pattern, RemovalRule};
use crate::config::CleaningRuleSet;
use crate::error::Result;
use regex::Regex;

/// What the filter does with a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDecision {
    /// Body line, kept unchanged
    Keep,
    /// Whitespace-only line, kept as an empty paragraph separator
    Blank,
    /// Contains the page-break sentinel
    PageBreak,
    /// Matches a header/footer pattern
    Footer,
    /// Short and not starting with an uppercase letter
    ShortFragment,
    /// Starts with a journal-metadata token (Journal, Volume, Issue, Pages, DOI)
    JournalHeader,
    /// Starts with an article-history keyword
    ArticleHistory,
}

/// Drops header/footer lines while keeping body lines and blank separators in order.
#[derive(Debug)]
pub struct LineFilter {
    page_break_marker: String,
    footer_patterns: Vec<Regex>,
    journal_header: Option<Regex>,
    history_entry: Option<Regex>,
    min_body_line_length: usize,
}

impl LineFilter {
    /// Compile the line filter from a rule set.
    pub fn new(rules: &CleaningRuleSet) -> Result<Self> {
        let footer_patterns = rules
            .footer_patterns
            .iter()
            .map(|p| compile_pattern("footer_patterns", p, true))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            page_break_marker: rules.page_break_marker.clone(),
            footer_patterns,
            journal_header: line_start_alternation("journal_metadata_tokens", &rules.journal_metadata_tokens)?,
            history_entry: line_start_alternation("history_keywords", &rules.history_keywords)?,
            min_body_line_length: rules.min_body_line_length,
        })
    }

    /// Classify one line.
    pub fn classify(&self, line: &str) -> LineDecision {
        if line.contains(&self.page_break_marker) {
            return LineDecision::PageBreak;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            return LineDecision::Blank;
        }

        if self.footer_patterns.iter().any(|re| re.is_match(trimmed)) {
            return LineDecision::Footer;
        }

        let starts_upper = trimmed.chars().next().is_some_and(char::is_uppercase);
        if !starts_upper && collapsed_len(trimmed) < self.min_body_line_length {
            return LineDecision::ShortFragment;
        }

        if self.journal_header.as_ref().is_some_and(|re| re.is_match(trimmed)) {
            return LineDecision::JournalHeader;
        }

        if self.history_entry.as_ref().is_some_and(|re| re.is_match(trimmed)) {
            return LineDecision::ArticleHistory;
        }

        LineDecision::Keep
    }
}

impl RemovalRule for LineFilter {
    fn name(&self) -> &str {
        "line_filter"
    }

    fn apply(&self, text: &str) -> String {
        let mut kept: Vec<&str> = Vec::new();
        let mut dropped = 0usize;

        for line in text.split('\n') {
            match self.classify(line) {
                LineDecision::Keep => kept.push(line),
                LineDecision::Blank => kept.push(""),
                _ => dropped += 1,
            }
        }

        log::debug!("line filter dropped {} line(s)", dropped);
        kept.join("\n")
    }
}

/// `^(?:a|b|c)` over keywords; `None` when there are no keywords.
fn line_start_alternation(rule: &str, keywords: &[String]) -> Result<Option<Regex>> {
    if keywords.is_empty() {
        return Ok(None);
    }
    let alternation = keywords
        .iter()
        .map(|k| keyword_pattern(k))
        .collect::<Vec<_>>()
        .join("|");
    compile_pattern(rule, &format!("^(?:{})", alternation), true).map(Some)
}

/// Length in characters with every whitespace run counted once.
fn collapsed_len(trimmed: &str) -> usize {
    let mut len = 0;
    let mut in_space = false;
    for c in trimmed.chars() {
        if c.is_whitespace() {
            if !in_space {
                len += 1;
            }
            in_space = true;
        } else {
            len += 1;
            in_space = false;
        }
    }
    len
}
