// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
#![allow(clippy::doc_overindented_list_items)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # PDF Article Cleaner
//!
//! Turns academic journal PDFs into DOCX files holding only the article body,
//! for building linguistic corpora.
//!
//! ## Pipeline
//!
//! 1. **Extraction**: page text via [`TextExtractor`] (default: [`LopdfExtractor`]),
//!    pages joined with a page-break sentinel
//! 2. **Sanitization**: control characters stripped from the raw text
//! 3. **Cleaning**: ordered [`RemovalRule`](cleaning::RemovalRule) passes remove
//!    metadata statements, article history, running headers/footers and
//!    keyword-anchored sections (abstract, references, acknowledgments, ...),
//!    then blank lines and spaces are collapsed; repeated until stable
//! 4. **Writing**: one paragraph per blank-line-separated block, Calibri 11 pt,
//!    via [`DocxWriter`]
//!
//! The cleaning rules are data ([`CleaningRuleSet`]) and can be loaded from JSON.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_article_cleaner::{BatchProcessor, CleaningRuleSet, LopdfExtractor, TextCleaner};
//! use std::path::Path;
//!
//! # fn main() -> pdf_article_cleaner::Result<()> {
//! let cleaner = TextCleaner::new(&CleaningRuleSet::default())?;
//! let processor = BatchProcessor::new(LopdfExtractor::new(), &cleaner);
//!
//! let report = processor.run_folder(Path::new("papers"), true, |p| {
//!     println!("[{}/{}] {}", p.index, p.total, p.outcome.file_name());
//! })?;
//! println!("{} succeeded, {} failed", report.succeeded, report.failed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Known limits
//!
//! Section boundaries are found heuristically: a line starting with three or
//! more uppercase letters or digits, or with "Introduction". Articles with
//! mixed-case headings lose body text after a removed section. Short lines
//! starting lowercase are treated as header fragments and dropped.
//!
//! Journal-metadata tokens (Journal, Volume, Issue, Pages, DOI) only match as
//! whole words at the start of a line, so "Issues of reliability ..." is kept
//! while "Issue 4, December 2019" is dropped.
//!
//! Each section keyword removes one section per [`TextCleaner::clean`] call.
//! If a keyword heads two sections, cleaning the output again removes the
//! second one; otherwise cleaning is idempotent.

pub mod batch;
pub mod cleaning;
pub mod config;
pub mod docx;
pub mod error;
pub mod extract;
pub mod interactive;

pub use batch::{BatchProcessor, BatchReport, FileOutcome, FileStatus};
pub use cleaning::TextCleaner;
pub use config::CleaningRuleSet;
pub use docx::{DocxConfig, DocxWriter};
pub use error::{Error, Result};
pub use extract::{LopdfExtractor, TextExtractor};
