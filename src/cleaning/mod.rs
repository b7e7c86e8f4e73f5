//! Text cleaning pipeline.
//!
//! Raw extracted text is sanitized, then goes through an ordered list of
//! [`RemovalRule`]s followed by whitespace normalization:
//!
//! 1. metadata blocks (conflict of interest, funding, supplementary material, grants)
//! 2. article history blocks and dates
//! 3. line filtering (page breaks, headers, footers, short fragments)
//! 4. keyword-anchored sections (abstract, references, acknowledgments, ...)
//!
//! Rules only delete text; surviving lines keep their relative order.
//!
//! One removal can expose another (a footer line dropped inside a metadata
//! window, a short fragment left after sanitization), so [`TextCleaner::clean`]
//! repeats the passes until the text stops changing. Each section keyword still
//! removes at most one section per call; see [`CleaningRun`].
//!
//! # Example
//!
//! ```
//! use pdf_article_cleaner::cleaning::TextCleaner;
//! use pdf_article_cleaner::config::CleaningRuleSet;
//!
//! let cleaner = TextCleaner::new(&CleaningRuleSet::default()).unwrap();
//! let cleaned = cleaner.clean("Page 3\nContent of sufficient length describing the methodology used in this paper.");
//! assert_eq!(cleaned, "Content of sufficient length describing the methodology used in this paper.");
//! ```

pub mod lines;
pub mod sanitize;
pub mod sections;
pub mod spans;
pub mod whitespace;

pub use lines::LineFilter;
pub use sanitize::sanitize;
pub use sections::SectionRemoval;
pub use spans::{PatternRemoval, SpanRemoval, SpanRule};
pub use whitespace::normalize_whitespace;

use crate::config::CleaningRuleSet;
use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

/// Upper bound on the compiled size of a single rule-set regex.
const PATTERN_SIZE_LIMIT: usize = 1 << 21;

/// One named removal pass over the whole text.
pub trait RemovalRule: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Return the text with this rule's matches removed.
    fn apply(&self, text: &str) -> String;

    /// Like [`apply`](Self::apply), with access to state shared by every pass
    /// of one [`TextCleaner::clean`] call.
    fn apply_in(&self, text: &str, _run: &mut CleaningRun) -> String {
        self.apply(text)
    }
}

/// State carried across the passes of one `clean` call.
#[derive(Debug, Default)]
pub struct CleaningRun {
    consumed: HashSet<String>,
}

impl CleaningRun {
    /// Whether `key` has already fired during this call.
    pub fn is_consumed(&self, key: &str) -> bool {
        self.consumed.contains(key)
    }

    /// Mark `key` as fired. Returns `false` if it already was.
    pub fn consume(&mut self, key: &str) -> bool {
        self.consumed.insert(key.to_string())
    }
}

/// Compiled, immutable cleaning pipeline.
pub struct TextCleaner {
    rules: Vec<Box<dyn RemovalRule>>,
    min_content_chars: usize,
}

impl std::fmt::Debug for TextCleaner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextCleaner")
            .field("rules", &self.rule_names())
            .field("min_content_chars", &self.min_content_chars)
            .finish()
    }
}

impl TextCleaner {
    /// Compile a rule set into the standard four-pass pipeline.
    pub fn new(rules: &CleaningRuleSet) -> Result<Self> {
        rules.validate()?;

        let metadata = SpanRemoval::new("metadata", &rules.metadata_rules, &rules.heading_pattern)?;

        let history = SpanRemoval::new(
            "article_history",
            &rules.article_history_rules,
            &rules.heading_pattern,
        )?
        .with_patterns(PatternRemoval::new("article_history_dates", &rules.article_history_patterns)?);

        let line_filter = LineFilter::new(rules)?;
        let sections = SectionRemoval::new(&rules.section_keywords, &rules.heading_pattern)?;

        Ok(Self::from_rules(vec![
            Box::new(metadata),
            Box::new(history),
            Box::new(line_filter),
            Box::new(sections),
        ])
        .with_min_content_chars(rules.min_content_chars))
    }

    /// Build a cleaner from an explicit rule list.
    pub fn from_rules(rules: Vec<Box<dyn RemovalRule>>) -> Self {
        Self {
            rules,
            min_content_chars: 0,
        }
    }

    /// Set the minimum cleaned-content length enforced by [`clean_document`](Self::clean_document).
    pub fn with_min_content_chars(mut self, chars: usize) -> Self {
        self.min_content_chars = chars;
        self
    }

    /// Names of the removal rules, in application order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Sanitize, then run every removal rule and normalize whitespace until
    /// the text is stable.
    ///
    /// The result is a fixed point: cleaning it again returns it unchanged,
    /// unless a section keyword still opens a line in it (a keyword heading
    /// several sections loses one section per call).
    pub fn clean(&self, raw: &str) -> String {
        let mut run = CleaningRun::default();
        let mut text = sanitize(raw);
        let mut passes = 0usize;
        // A pass either returns its input unchanged or a strictly shorter text.
        loop {
            passes += 1;
            let next = self.clean_pass(&text, &mut run);
            if next == text {
                break;
            }
            text = next;
        }
        log::debug!("cleaning stable after {} pass(es)", passes);
        text
    }

    fn clean_pass(&self, text: &str, run: &mut CleaningRun) -> String {
        let mut text = text.to_string();
        for rule in &self.rules {
            let before = text.len();
            text = rule.apply_in(&text, run);
            log::debug!("rule '{}' removed {} bytes", rule.name(), before.saturating_sub(text.len()));
        }
        normalize_whitespace(&text)
    }

    /// Clean one document, treating a pipeline panic or a too-short result as
    /// a per-file failure.
    pub fn clean_document(&self, raw: &str) -> Result<String> {
        let cleaned = panic::catch_unwind(AssertUnwindSafe(|| self.clean(raw)))
            .map_err(|payload| Error::Cleaning(panic_message(payload.as_ref())))?;

        let chars = cleaned.chars().count();
        if chars < self.min_content_chars {
            return Err(Error::InsufficientContent {
                chars,
                min: self.min_content_chars,
            });
        }
        Ok(cleaned)
    }
}

/// Compile a rule-set regex: multi-line, size-limited, optionally case-insensitive.
pub(crate) fn compile_pattern(rule: &str, pattern: &str, case_insensitive: bool) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .multi_line(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
        .map_err(|source| Error::InvalidPattern {
            rule: rule.to_string(),
            source,
        })
}

/// Regex source for a keyword: escaped words joined by flexible whitespace,
/// with a trailing word boundary when the keyword ends in a word character.
pub(crate) fn keyword_pattern(keyword: &str) -> String {
    let body = keyword
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    if keyword.trim_end().ends_with(|c: char| c.is_alphanumeric() || c == '_') {
        format!(r"{}\b", body)
    } else {
        body
    }
}

/// Extract a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
