//! Span and pattern removal rules.
//!
//! A [`SpanRule`] deletes text from an opener (e.g. "conflict of interest") up
//! to the earliest accepted terminator that starts inside a bounded window.
//! The window counts characters as whitespace normalization will leave them:
//! a run of spaces or tabs counts once. Terminators are kept. An opener with no terminator inside its window is
//! left alone.
//!
//! Terminator searches are memoized per rule pass, so one pass costs
//! O(text length × terminators) regardless of how many openers match.

use super::{compile_pattern, RemovalRule};
use crate::config::{SpanRuleSpec, Terminator};
use crate::error::Result;
use regex::Regex;
use std::ops::Range;

#[derive(Debug)]
enum Stop {
    Pattern(Regex),
    EndOfText,
}

/// Compiled form of a [`SpanRuleSpec`].
#[derive(Debug)]
pub struct SpanRule {
    name: String,
    opener: Regex,
    max_span: Option<usize>,
    stops: Vec<Stop>,
}

impl SpanRule {
    /// Compile a span rule. `heading_pattern` backs [`Terminator::HeadingLine`].
    pub fn new(spec: &SpanRuleSpec, heading_pattern: &str) -> Result<Self> {
        let opener = compile_pattern(&spec.name, &spec.opener, true)?;

        let mut stops = Vec::with_capacity(spec.terminators.len());
        for terminator in &spec.terminators {
            let stop = match terminator {
                Terminator::EndOfText => Stop::EndOfText,
                Terminator::BlankLine => Stop::Pattern(compile_pattern(&spec.name, r"\n\n", false)?),
                Terminator::Newline => Stop::Pattern(compile_pattern(&spec.name, r"\n", false)?),
                Terminator::Char(c) => {
                    Stop::Pattern(compile_pattern(&spec.name, &regex::escape(&c.to_string()), false)?)
                },
                Terminator::Word(word) => {
                    Stop::Pattern(compile_pattern(&spec.name, &regex::escape(word), true)?)
                },
                Terminator::HeadingLine => {
                    Stop::Pattern(compile_pattern(&spec.name, heading_pattern, false)?)
                },
                Terminator::WordLine => {
                    Stop::Pattern(compile_pattern(&spec.name, r"^[a-z]{3,}\s", true)?)
                },
            };
            stops.push(stop);
        }

        Ok(Self {
            name: spec.name.clone(),
            opener,
            max_span: spec.max_span,
            stops,
        })
    }

    /// Byte ranges this rule would delete, in order and non-overlapping.
    pub fn find_spans(&self, text: &str) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        // Per stop: None = not searched yet, Some(None) = no match at or after
        // the last search position, Some(Some(p)) = next match starts at p.
        let mut next_stop: Vec<Option<Option<usize>>> = vec![None; self.stops.len()];
        let mut cursor = 0;

        while cursor <= text.len() {
            let Some(open) = self.opener.find_at(text, cursor) else {
                break;
            };
            if open.is_empty() {
                cursor = next_char_boundary(text, open.end());
                continue;
            }

            let from = open.end();
            let limit = window_limit(text, from, self.max_span);
            let mut end: Option<usize> = None;

            for (stop, cached) in self.stops.iter().zip(next_stop.iter_mut()) {
                let hit = match stop {
                    Stop::EndOfText => Some(text.len()),
                    Stop::Pattern(re) => match *cached {
                        Some(Some(pos)) if pos >= from => Some(pos),
                        Some(None) => None,
                        _ => {
                            let found = re.find_at(text, from).map(|m| m.start());
                            *cached = Some(found);
                            found
                        },
                    },
                };
                if let Some(pos) = hit {
                    if pos <= limit && end.map_or(true, |e| pos < e) {
                        end = Some(pos);
                    }
                }
            }

            match end {
                Some(end) => {
                    spans.push(open.start()..end);
                    cursor = end;
                },
                None => cursor = from,
            }
        }

        spans
    }

    /// Return `text` with every span removed.
    pub fn remove(&self, text: &str) -> String {
        let spans = self.find_spans(text);
        if spans.is_empty() {
            return text.to_string();
        }
        log::debug!("span rule '{}' removed {} block(s)", self.name, spans.len());

        let mut result = String::with_capacity(text.len());
        let mut last = 0;
        for span in spans {
            result.push_str(&text[last..span.start]);
            last = span.end;
        }
        result.push_str(&text[last..]);
        result
    }
}

/// Byte offset `max_span` characters after `from`, or the end of the text.
/// Each run of spaces and tabs counts as one character.
fn window_limit(text: &str, from: usize, max_span: Option<usize>) -> usize {
    let Some(n) = max_span else {
        return text.len();
    };
    let mut counted = 0;
    let mut prev_blank = false;
    for (i, c) in text[from..].char_indices() {
        let blank = c == ' ' || c == '\t';
        if !(blank && prev_blank) {
            if counted == n {
                return from + i;
            }
            counted += 1;
        }
        prev_blank = blank;
    }
    text.len()
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map(|c| pos + c.len_utf8())
        .unwrap_or(text.len() + 1)
}

/// Deletes every match of a list of plain regexes.
#[derive(Debug)]
pub struct PatternRemoval {
    name: String,
    patterns: Vec<Regex>,
}

impl PatternRemoval {
    /// Compile case-insensitive removal patterns.
    pub fn new(name: &str, patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| compile_pattern(name, p, true))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: name.to_string(),
            patterns,
        })
    }
}

impl RemovalRule for PatternRemoval {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();
        for pattern in &self.patterns {
            result = pattern.replace_all(&result, "").into_owned();
        }
        result
    }
}

/// A named group of span rules applied one after another, optionally
/// followed by plain pattern removal.
#[derive(Debug)]
pub struct SpanRemoval {
    name: String,
    rules: Vec<SpanRule>,
    patterns: Option<PatternRemoval>,
}

impl SpanRemoval {
    /// Compile a group of span rules.
    pub fn new(name: &str, specs: &[SpanRuleSpec], heading_pattern: &str) -> Result<Self> {
        let rules = specs
            .iter()
            .map(|spec| SpanRule::new(spec, heading_pattern))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: name.to_string(),
            rules,
            patterns: None,
        })
    }

    /// Run `patterns` after the span rules.
    pub fn with_patterns(mut self, patterns: PatternRemoval) -> Self {
        self.patterns = Some(patterns);
        self
    }
}

impl RemovalRule for SpanRemoval {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();
        for rule in &self.rules {
            result = rule.remove(&result);
        }
        if let Some(patterns) = &self.patterns {
            result = patterns.apply(&result);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CleaningRuleSet;

    const HEADING: &str = r"^[A-Z\d]{3,}\s";

    fn metadata() -> SpanRemoval {
        SpanRemoval::new("metadata", &CleaningRuleSet::default().metadata_rules, HEADING).unwrap()
    }

    fn history() -> SpanRemoval {
        let rules = CleaningRuleSet::default();
        SpanRemoval::new("article_history", &rules.article_history_rules, HEADING)
            .unwrap()
            .with_patterns(
                PatternRemoval::new("dates", &rules.article_history_patterns).unwrap(),
            )
    }

    #[test]
    fn test_conflict_statement_removed_up_to_blank_line() {
        let input = "Conflict of interest: The authors declare no conflict.\n\nBody text follows here.";
        assert_eq!(metadata().apply(input), "\n\nBody text follows here.");
    }

    #[test]
    fn test_conflict_statement_stops_at_following_section_word() {
        let input = "Conflict of interest: none. Acknowledgments: we thank the reviewers.";
        assert_eq!(metadata().apply(input), "Acknowledgments: we thank the reviewers.");
    }

    #[test]
    fn test_conflict_statement_spans_single_newlines() {
        let input = "Conflict of Interest\nThe authors report\nno competing interests.\n\nNext.";
        assert_eq!(metadata().apply(input), "\n\nNext.");
    }

    #[test]
    fn test_opener_without_terminator_in_window_is_kept() {
        let long = "x".repeat(600);
        let input = format!("conflict of interest {}\n\nEnd", long);
        assert_eq!(metadata().apply(&input), input);
    }

    #[test]
    fn test_end_of_text_inside_window() {
        let input = "Body paragraph.\n\nFunding statement: none declared";
        assert_eq!(metadata().apply(input), "Body paragraph.\n\n");
    }

    #[test]
    fn test_inline_funding_stops_before_period() {
        let input = "This work was supported by the National Science Foundation. We also thank Ann.";
        assert_eq!(metadata().apply(input), ". We also thank Ann.");
    }

    #[test]
    fn test_grant_number_stops_at_newline() {
        let input = "See grant number ABC-123 for details\nNext line";
        assert_eq!(metadata().apply(input), "See \nNext line");
    }

    #[test]
    fn test_every_occurrence_removed() {
        let input = "grant number 1.\ngrant number 2.\n";
        assert_eq!(metadata().apply(input), ".\n.\n");
    }

    #[test]
    fn test_article_history_block() {
        let input = "Article history:\nReceived 3 May 2020\nBody starts here and continues.";
        let output = history().apply(input);
        assert!(!output.contains("Article history"));
        assert!(!output.contains("3 May 2020"));
        assert!(output.contains("Body starts here and continues."));
    }

    #[test]
    fn test_history_dates_removed_inline() {
        let input = "The paper (received 12 March 2021, accepted 4 June 2021) is long.";
        let output = history().apply(input);
        assert_eq!(output, "The paper (, ) is long.");
    }

    #[test]
    fn test_find_spans_are_ordered_and_disjoint() {
        let rule = SpanRule::new(&CleaningRuleSet::default().metadata_rules[4], HEADING).unwrap();
        let text = "grant number 1. grant number 2. grant number 3.";
        let spans = rule.find_spans(text);
        assert_eq!(spans.len(), 3);
        for pair in spans.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn test_window_counts_characters_not_bytes() {
        let spec = SpanRuleSpec::new("t", "open", Some(3), vec![Terminator::Char('.')]);
        let rule = SpanRule::new(&spec, HEADING).unwrap();
        assert_eq!(rule.remove("openäöü. tail"), ". tail");
        assert_eq!(rule.remove("openäöüx. tail"), "openäöüx. tail");
    }

    #[test]
    fn test_window_counts_space_runs_once() {
        let spec = SpanRuleSpec::new("t", "open", Some(5), vec![Terminator::Char('.')]);
        let rule = SpanRule::new(&spec, HEADING).unwrap();
        assert_eq!(rule.remove(&format!("open{}\t abc. tail", " ".repeat(40))), ". tail");
        assert_eq!(rule.remove("open a b c. tail"), "open a b c. tail");
    }

    #[test]
    fn test_padded_conflict_statement_removed() {
        let input = format!(
            "We declare a conflict of interest{}{}\n\nBody text line.",
            " ".repeat(100),
            "a".repeat(450)
        );
        assert_eq!(metadata().apply(&input), "We declare a \n\nBody text line.");
    }

    #[test]
    fn test_unicode_text_untouched_without_matches() {
        let input = "Ünïcödé body text, no metadata here.";
        assert_eq!(metadata().apply(input), input);
    }
}
