//! Rule-set configuration for the cleaning pipeline.
//!
//! [`CleaningRuleSet`] is plain data: keyword tables, regex sources and
//! thresholds. It is built once at startup (from the defaults or a JSON file),
//! compiled into a [`TextCleaner`](crate::cleaning::TextCleaner) and then only
//! read.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Marker inserted between pages by the text extractor.
pub const PAGE_BREAK_MARKER: &str = "---PAGE_BREAK---";

/// Lines shorter than this (and not starting with an uppercase letter) are
/// treated as running headers or footers.
pub const MIN_BODY_LINE_LENGTH: usize = 20;

/// Cleaned articles shorter than this are not worth writing out.
pub const MIN_CONTENT_CHARS: usize = 500;

/// A named class of non-body content and the keywords that open it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionCategory {
    /// Category name, e.g. `references`
    pub name: String,
    /// Trigger keywords, tried in order
    pub keywords: Vec<String>,
}

impl SectionCategory {
    /// Create a category from a name and keyword list.
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Where a span opened by a [`SpanRuleSpec`] may stop.
///
/// The terminator itself is never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminator {
    /// Two consecutive newlines
    BlankLine,
    /// A single newline
    Newline,
    /// End of the text
    EndOfText,
    /// A word, matched case-insensitively anywhere
    Word(String),
    /// A single character
    Char(char),
    /// Start of a heading-like line (see [`CleaningRuleSet::heading_pattern`])
    HeadingLine,
    /// Start of a line opening with a word of 3+ letters followed by whitespace
    WordLine,
}

/// A span removal rule: an opener regex plus the places the span may end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanRuleSpec {
    /// Rule name used in logs and errors
    pub name: String,
    /// Regex that opens the span (matched case-insensitively)
    pub opener: String,
    /// Maximum span length in characters after the opener; `None` is unbounded
    pub max_span: Option<usize>,
    /// Accepted stopping points; the earliest one inside the window wins
    pub terminators: Vec<Terminator>,
}

impl SpanRuleSpec {
    /// Create a span rule.
    pub fn new(name: &str, opener: &str, max_span: Option<usize>, terminators: Vec<Terminator>) -> Self {
        Self {
            name: name.to_string(),
            opener: opener.to_string(),
            max_span,
            terminators,
        }
    }
}

/// Static configuration of the cleaning pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningRuleSet {
    /// Page-break sentinel; lines containing it are dropped
    pub page_break_marker: String,
    /// Section categories in removal order
    pub section_keywords: Vec<SectionCategory>,
    /// Single-line header/footer patterns, matched against the trimmed line
    pub footer_patterns: Vec<String>,
    /// Multi-line metadata blocks (conflict, funding, supplementary, grants)
    pub metadata_rules: Vec<SpanRuleSpec>,
    /// "Article history" blocks
    pub article_history_rules: Vec<SpanRuleSpec>,
    /// Whole-match patterns for explicit history dates
    pub article_history_patterns: Vec<String>,
    /// Line-start tokens of repeated journal headers
    pub journal_metadata_tokens: Vec<String>,
    /// Line-start keywords of article-history entries
    pub history_keywords: Vec<String>,
    /// Line-anchored regex for a heading-like section boundary (case-sensitive)
    pub heading_pattern: String,
    /// Minimum length of a lowercase-led body line
    pub min_body_line_length: usize,
    /// Minimum characters left after cleaning for a file to count as cleaned
    pub min_content_chars: usize,
}

impl Default for CleaningRuleSet {
    fn default() -> Self {
        Self::new()
    }
}

impl CleaningRuleSet {
    /// Create the default rule set for English-language research articles.
    pub fn new() -> Self {
        use Terminator::*;

        let word = |w: &str| Word(w.to_string());

        Self {
            page_break_marker: PAGE_BREAK_MARKER.to_string(),
            section_keywords: vec![
                SectionCategory::new("abstract", &["abstract", "summary"]),
                SectionCategory::new("keywords", &["keywords", "key words", "index terms"]),
                SectionCategory::new("acknowledgments", &["acknowledgments", "acknowledgements"]),
                SectionCategory::new(
                    "funding",
                    &["funding statement", "financial disclosure", "grant", "supported by"],
                ),
                SectionCategory::new(
                    "conflict",
                    &["conflict of interest", "declaration of interest", "competing interests"],
                ),
                SectionCategory::new(
                    "supplementary",
                    &[
                        "supplementary material",
                        "supplementary information",
                        "supporting information",
                        "appendix",
                    ],
                ),
                SectionCategory::new(
                    "author_info",
                    &["author information", "correspondence", "author details", "affiliation"],
                ),
                SectionCategory::new(
                    "references",
                    &["references", "bibliography", "citations", "works cited"],
                ),
                SectionCategory::new(
                    "abbreviations",
                    &["list of abbreviations", "abbreviations", "list of acronyms"],
                ),
                SectionCategory::new(
                    "article_history",
                    &["article history", "received", "revised", "accepted", "available online"],
                ),
            ],
            footer_patterns: vec![
                r"^page\s+\d+(\s*(of|/)\s*\d+)?\s*$".to_string(),
                r"^\d+$".to_string(),
                r"^-\s*\d+\s*-$".to_string(),
                r"^[\[(]\d+[\])]$".to_string(),
                r"^https?://\S+".to_string(),
                r"^(copyright\s*)?©\s*\d{4}".to_string(),
                r"^vol\.?\s*\d+".to_string(),
                r"^pp\.?\s*\d+".to_string(),
                r"^[-=_]{5,}$".to_string(),
                r"^(received|revised|accepted|available\s+online)\b".to_string(),
            ],
            metadata_rules: vec![
                SpanRuleSpec::new(
                    "conflict_of_interest",
                    r"conflict\s+of\s+interest",
                    Some(500),
                    vec![BlankLine, word("introduction"), word("acknowledgments"), EndOfText],
                ),
                SpanRuleSpec::new(
                    "funding_statement",
                    r"funding\s+(statement|disclosure|information)",
                    Some(300),
                    vec![BlankLine, word("conflict"), word("acknowledgments"), EndOfText],
                ),
                SpanRuleSpec::new(
                    "supplementary_reference",
                    r"supplementary\s+(material|information|data)",
                    Some(200),
                    vec![BlankLine, word("appendix"), word("references"), EndOfText],
                ),
                SpanRuleSpec::new(
                    "inline_funding",
                    r"this\s+work\s+was\s+(supported|funded)\s+by",
                    Some(200),
                    vec![Char('.'), Newline],
                ),
                SpanRuleSpec::new("grant_number", r"grant\s+number", Some(150), vec![Newline, Char('.')]),
            ],
            article_history_rules: vec![SpanRuleSpec::new(
                "article_history",
                r"article\s+history",
                None,
                vec![HeadingLine, word("introduction"), WordLine, EndOfText],
            )],
            article_history_patterns: vec![
                r"(received|revised|accepted|available\s+online)\s+\d+\s+(january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{4}"
                    .to_string(),
            ],
            journal_metadata_tokens: ["journal", "volume", "issue", "pages", "doi"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            history_keywords: ["received", "revised", "accepted", "available online"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            heading_pattern: r"^[A-Z\d]{3,}\s".to_string(),
            min_body_line_length: MIN_BODY_LINE_LENGTH,
            min_content_chars: MIN_CONTENT_CHARS,
        }
    }

    /// Load a rule set from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read rule set {}: {}", path.display(), e))
        })?;
        let rules = Self::from_json(&contents)?;
        log::debug!("Loaded rule set from {}", path.display());
        Ok(rules)
    }

    /// Parse a rule set from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Serialize the rule set as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.page_break_marker.trim().is_empty() {
            return Err(Error::Config("page_break_marker must not be empty".to_string()));
        }
        for category in &self.section_keywords {
            if category.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(Error::Config(format!(
                    "section '{}' contains an empty keyword",
                    category.name
                )));
            }
        }
        for rule in self.metadata_rules.iter().chain(&self.article_history_rules) {
            if rule.terminators.is_empty() {
                return Err(Error::Config(format!("span rule '{}' has no terminators", rule.name)));
            }
        }
        Ok(())
    }

    /// Set the minimum body-line length.
    pub fn with_min_body_line_length(mut self, length: usize) -> Self {
        self.min_body_line_length = length;
        self
    }

    /// Set the minimum cleaned-content length.
    pub fn with_min_content_chars(mut self, chars: usize) -> Self {
        self.min_content_chars = chars;
        self
    }
}
