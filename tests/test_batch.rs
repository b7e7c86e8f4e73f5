//! Batch driver tests with a stub extractor.

use pdf_article_cleaner::batch::{
    output_path_for, BatchProcessor, FileStatus, OUTPUT_DIR_NAME,
};
use pdf_article_cleaner::cleaning::TextCleaner;
use pdf_article_cleaner::config::CleaningRuleSet;
use pdf_article_cleaner::extract::{join_pages, TextExtractor};
use pdf_article_cleaner::{Error, Result};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

const BODY: &str = "\
Hedging has long been recognised as a central feature of academic prose.
Writers use hedges to signal caution and to anticipate objections from
readers who may not share their assumptions about the evidence.
The corpus comprises two hundred research articles drawn from four disciplines.
Each article was tagged for modal verbs, epistemic adverbs and reporting verbs.
Expert writers used significantly more hedges per thousand words than novices.
The difference held across disciplines and across sections of the articles.
These findings suggest that hedging is learned through disciplinary practice.";

/// Returns a fixed article; file names steer failures.
struct StubExtractor {
    calls: Cell<usize>,
}

impl StubExtractor {
    fn new() -> Self {
        Self { calls: Cell::new(0) }
    }
}

impl TextExtractor for StubExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        let name = path.file_name().unwrap().to_string_lossy();
        if name.contains("corrupt") {
            return Err(Error::Extraction {
                path: path.to_path_buf(),
                reason: "invalid cross-reference table".to_string(),
            });
        }
        if name.contains("tiny") {
            return Ok(join_pages(&["Page 1\nToo short to be an article."], "---PAGE_BREAK---"));
        }
        Ok(join_pages(&["Page 1", BODY, "References\nSmith, J. (2001). Title."], "---PAGE_BREAK---"))
    }
}

fn cleaner() -> TextCleaner {
    TextCleaner::new(&CleaningRuleSet::default()).unwrap()
}

fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"%PDF-1.4 stub").unwrap();
    path
}

#[test]
fn test_empty_folder_reports_nothing_and_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "notes.txt");
    let cleaner = cleaner();
    let processor = BatchProcessor::new(StubExtractor::new(), &cleaner);

    let mut calls = 0;
    let report = processor.run_folder(dir.path(), true, |_| calls += 1).unwrap();

    assert!(report.is_empty());
    assert_eq!((report.succeeded, report.failed), (0, 0));
    assert_eq!(calls, 0);
    assert!(!dir.path().join(OUTPUT_DIR_NAME).exists());
}

#[test]
fn test_one_failure_out_of_three() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "a_first.pdf");
    touch(dir.path(), "b_corrupt.pdf");
    touch(dir.path(), "c_third.PDF");
    let cleaner = cleaner();
    let processor = BatchProcessor::new(StubExtractor::new(), &cleaner);

    let mut seen = Vec::new();
    let report = processor
        .run_folder(dir.path(), true, |p| seen.push((p.index, p.total, p.outcome.is_success())))
        .unwrap();

    assert_eq!((report.succeeded, report.failed, report.total()), (2, 1, 3));
    assert_eq!(seen, vec![(1, 3, true), (2, 3, false), (3, 3, true)]);

    let out = dir.path().join(OUTPUT_DIR_NAME);
    assert!(out.join("a_first_cleaned.docx").is_file());
    assert!(out.join("c_third_cleaned.docx").is_file());
    assert!(!out.join("b_corrupt_cleaned.docx").exists());

    match &report.outcomes[1].status {
        FileStatus::Failed { reason } => assert!(reason.contains("invalid cross-reference table")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn test_counters_match_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let files: Vec<PathBuf> = ["one.pdf", "two_corrupt.pdf", "three_tiny.pdf", "four.pdf"]
        .iter()
        .map(|n| touch(dir.path(), n))
        .chain(std::iter::once(dir.path().join("missing.pdf")))
        .collect();
    let cleaner = cleaner();
    let processor = BatchProcessor::new(StubExtractor::new(), &cleaner);

    let report = processor.run_files(&files, |_| {});

    assert_eq!(report.total(), files.len());
    assert_eq!(report.outcomes.len(), report.total());
    assert_eq!(report.succeeded, report.outcomes.iter().filter(|o| o.is_success()).count());
    assert_eq!((report.succeeded, report.failed), (2, 3));
}

#[test]
fn test_missing_file_is_failed_without_extracting() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone.pdf");
    let cleaner = cleaner();
    let extractor = StubExtractor::new();
    let processor = BatchProcessor::new(&extractor, &cleaner);

    let err = processor.process_file(&missing, dir.path()).unwrap_err();
    assert!(matches!(err, Error::FileNotFound(_)));
    assert_eq!(extractor.calls.get(), 0);
}

#[test]
fn test_insufficient_content_is_failed() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "tiny.pdf");
    let cleaner = cleaner();
    let processor = BatchProcessor::new(StubExtractor::new(), &cleaner);

    let err = processor.process_file(&input, &dir.path().join(OUTPUT_DIR_NAME)).unwrap_err();
    assert!(matches!(err, Error::InsufficientContent { .. }));
    assert!(!output_path_for(&input, &dir.path().join(OUTPUT_DIR_NAME)).exists());
}

#[test]
fn test_explicit_files_write_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("sub")).unwrap();
    let a = touch(dir.path(), "a.pdf");
    let b = touch(&dir.path().join("sub"), "b.pdf");
    let cleaner = cleaner();
    let processor = BatchProcessor::new(StubExtractor::new(), &cleaner);

    let report = processor.run_files(&[a, b], |_| {});

    assert_eq!(report.succeeded, 2);
    assert!(dir.path().join(OUTPUT_DIR_NAME).join("a_cleaned.docx").is_file());
    assert!(dir.path().join("sub").join(OUTPUT_DIR_NAME).join("b_cleaned.docx").is_file());
}

#[test]
fn test_folder_rerun_ignores_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "paper.pdf");
    let cleaner = cleaner();
    let processor = BatchProcessor::new(StubExtractor::new(), &cleaner);

    let first = processor.run_folder(dir.path(), true, |_| {}).unwrap();
    touch(&dir.path().join(OUTPUT_DIR_NAME), "stray.pdf");
    let second = processor.run_folder(dir.path(), true, |_| {}).unwrap();

    assert_eq!(first.total(), 1);
    assert_eq!(second.total(), 1);
}

#[test]
fn test_missing_folder_is_error() {
    let cleaner = cleaner();
    let processor = BatchProcessor::new(StubExtractor::new(), &cleaner);
    let err = processor
        .run_folder(Path::new("/nonexistent/papers"), true, |_| {})
        .unwrap_err();
    assert!(matches!(err, Error::FolderNotFound(_)));
}

#[test]
fn test_run_discovered_uses_given_list_only() {
    let dir = tempfile::tempdir().unwrap();
    let listed = vec![touch(dir.path(), "listed.pdf")];
    touch(dir.path(), "late_arrival.pdf");
    let cleaner = cleaner();
    let extractor = StubExtractor::new();
    let processor = BatchProcessor::new(&extractor, &cleaner);

    let report = processor.run_discovered(dir.path(), &listed, |_| {}).unwrap();

    assert_eq!(report.total(), 1);
    assert_eq!(extractor.calls.get(), 1);
    let out = dir.path().join(OUTPUT_DIR_NAME);
    assert!(out.join("listed_cleaned.docx").is_file());
    assert!(!out.join("late_arrival_cleaned.docx").exists());
}

#[test]
fn test_run_discovered_empty_list_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let cleaner = cleaner();
    let processor = BatchProcessor::new(StubExtractor::new(), &cleaner);

    let report = processor.run_discovered(dir.path(), &[], |_| {}).unwrap();

    assert!(report.is_empty());
    assert!(!dir.path().join(OUTPUT_DIR_NAME).exists());
}

#[test]
fn test_output_title_is_input_stem() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "hyland_1998.pdf");
    let cleaner = cleaner();
    let processor = BatchProcessor::new(StubExtractor::new(), &cleaner);

    let output = processor.process_file(&input, &dir.path().join(OUTPUT_DIR_NAME)).unwrap();

    let mut archive = zip::ZipArchive::new(fs::File::open(output).unwrap()).unwrap();
    let mut core = String::new();
    std::io::Read::read_to_string(&mut archive.by_name("docProps/core.xml").unwrap(), &mut core).unwrap();
    assert!(core.contains("<dc:title>hyland_1998</dc:title>"));
}
