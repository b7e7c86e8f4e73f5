//! Batch driver: discover PDFs, extract, clean and write one DOCX per input.
//!
//! Every per-file failure is caught here and recorded as a failed
//! [`FileOutcome`]; one bad document never stops the batch.

use crate::cleaning::TextCleaner;
use crate::docx::{DocxConfig, DocxWriter};
use crate::error::{Error, Result};
use crate::extract::TextExtractor;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name of the output directory created next to the inputs.
pub const OUTPUT_DIR_NAME: &str = "cleaned_articles";

/// Suffix appended to the input stem.
pub const OUTPUT_SUFFIX: &str = "_cleaned";

/// Whether `path` has a `.pdf` extension, in any case.
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Output directory for an explicitly listed input file.
pub fn output_dir_for(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(OUTPUT_DIR_NAME),
        _ => PathBuf::from(OUTPUT_DIR_NAME),
    }
}

/// `<output_dir>/<stem>_cleaned.docx`.
///
/// # Examples
///
/// ```
/// use pdf_article_cleaner::batch::output_path_for;
/// use std::path::Path;
///
/// let out = output_path_for(Path::new("papers/smith2020.PDF"), Path::new("papers/cleaned_articles"));
/// assert_eq!(out, Path::new("papers/cleaned_articles/smith2020_cleaned.docx"));
/// ```
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    output_dir.join(format!("{}{}.docx", stem, OUTPUT_SUFFIX))
}

/// Find PDF files under `folder`, sorted by path.
///
/// Recurses into subdirectories unless `recursive` is false, and never descends
/// into a `cleaned_articles` directory.
pub fn discover_pdfs(folder: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(Error::FolderNotFound(folder.to_path_buf()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && e.file_name() == OUTPUT_DIR_NAME));

    let mut pdfs = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) => {
                if is_pdf(entry.path()) && entry.path().is_file() {
                    pdfs.push(entry.into_path());
                }
            },
            Err(e) => log::warn!("skipping unreadable entry: {}", e),
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

/// Result of processing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    /// Cleaned document written to `output`
    Succeeded { output: PathBuf },
    /// Processing stopped at `reason`
    Failed { reason: String },
}

/// One input file and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub input: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, FileStatus::Succeeded { .. })
    }

    /// Display name of the input.
    pub fn file_name(&self) -> String {
        self.input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input.display().to_string())
    }
}

/// Counters and per-file outcomes for one batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    /// Number of files attempted.
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    /// True when no file was attempted.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    fn record(&mut self, outcome: FileOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }
}

/// Progress notification sent after each file.
#[derive(Debug)]
pub struct Progress<'r> {
    /// 1-based position in the batch
    pub index: usize,
    pub total: usize,
    pub outcome: &'r FileOutcome,
}

/// Runs extraction, cleaning and writing over a list of files.
#[derive(Debug)]
pub struct BatchProcessor<'a, E: TextExtractor> {
    extractor: E,
    cleaner: &'a TextCleaner,
    docx: DocxConfig,
}

impl<'a, E: TextExtractor> BatchProcessor<'a, E> {
    pub fn new(extractor: E, cleaner: &'a TextCleaner) -> Self {
        Self {
            extractor,
            cleaner,
            docx: DocxConfig::new(),
        }
    }

    /// Extract, clean and write one file into `output_dir`.
    pub fn process_file(&self, input: &Path, output_dir: &Path) -> Result<PathBuf> {
        if !input.is_file() {
            return Err(Error::FileNotFound(input.to_path_buf()));
        }

        let raw = self.extractor.extract(input)?;
        let cleaned = self.cleaner.clean_document(&raw)?;
        log::debug!(
            "{}: {} chars extracted, {} kept",
            input.display(),
            raw.chars().count(),
            cleaned.chars().count()
        );

        let output = output_path_for(input, output_dir);
        let mut docx = self.docx.clone();
        if let Some(stem) = input.file_stem() {
            docx = docx.with_title(stem.to_string_lossy());
        }
        DocxWriter::with_config(docx).write_file(&cleaned, &output)?;
        log::info!("saved {}", output.display());
        Ok(output)
    }

    fn outcome_for(&self, input: &Path, output_dir: &Path) -> FileOutcome {
        let status = match self.process_file(input, output_dir) {
            Ok(output) => FileStatus::Succeeded { output },
            Err(err) => {
                match &err {
                    Error::FileNotFound(_) => log::warn!("skipping {}: {}", input.display(), err),
                    _ => log::error!("failed {}: {}", input.display(), err),
                }
                FileStatus::Failed {
                    reason: err.to_string(),
                }
            },
        };
        FileOutcome {
            input: input.to_path_buf(),
            status,
        }
    }

    fn run<F>(&self, files: &[PathBuf], output_dir: impl Fn(&Path) -> PathBuf, mut on_progress: F) -> BatchReport
    where
        F: FnMut(&Progress<'_>),
    {
        let mut report = BatchReport::default();
        let total = files.len();
        for (i, input) in files.iter().enumerate() {
            log::info!("[{}/{}] processing {}", i + 1, total, input.display());
            let outcome = self.outcome_for(input, &output_dir(input));
            on_progress(&Progress {
                index: i + 1,
                total,
                outcome: &outcome,
            });
            report.record(outcome);
        }
        log::info!(
            "batch complete: {} attempted, {} succeeded, {} failed",
            report.total(),
            report.succeeded,
            report.failed
        );
        report
    }

    /// Process explicitly listed files; each output goes to a
    /// `cleaned_articles` directory next to its input.
    pub fn run_files<F>(&self, files: &[PathBuf], on_progress: F) -> BatchReport
    where
        F: FnMut(&Progress<'_>),
    {
        self.run(files, output_dir_for, on_progress)
    }

    /// Process every PDF found under `folder` into `folder/cleaned_articles`.
    ///
    /// A folder with no PDFs yields an empty report and creates nothing.
    pub fn run_folder<F>(&self, folder: &Path, recursive: bool, on_progress: F) -> Result<BatchReport>
    where
        F: FnMut(&Progress<'_>),
    {
        let pdfs = discover_pdfs(folder, recursive)?;
        self.run_discovered(folder, &pdfs, on_progress)
    }

    /// Process PDFs already discovered under `folder` into
    /// `folder/cleaned_articles`, without walking the folder again.
    ///
    /// An empty list yields an empty report and creates nothing.
    pub fn run_discovered<F>(&self, folder: &Path, pdfs: &[PathBuf], on_progress: F) -> Result<BatchReport>
    where
        F: FnMut(&Progress<'_>),
    {
        if pdfs.is_empty() {
            log::warn!("no PDF files found in {}", folder.display());
            return Ok(BatchReport::default());
        }

        let output_dir = folder.join(OUTPUT_DIR_NAME);
        fs::create_dir_all(&output_dir)?;
        log::info!("found {} PDF file(s), writing to {}", pdfs.len(), output_dir.display());

        Ok(self.run(pdfs, |_| output_dir.clone(), on_progress))
    }
}
