//! Prompt-driven session used when the binary is started without arguments.
//!
//! The session reads choices from any [`BufRead`] and writes its log to any
//! [`Write`], so it runs the same over a terminal or in tests.

use crate::batch::{discover_pdfs, BatchProcessor, BatchReport, Progress};
use crate::error::Result;
use crate::extract::TextExtractor;
use std::io::{BufRead, Write};
use std::path::PathBuf;

const RULE: &str = "======================================================================";

/// Interactive front end over a [`BatchProcessor`].
pub struct InteractiveSession<'p, 'c, E: TextExtractor, R, W> {
    processor: &'p BatchProcessor<'c, E>,
    input: R,
    output: W,
    recursive: bool,
}

impl<'p, 'c, E: TextExtractor, R: BufRead, W: Write> InteractiveSession<'p, 'c, E, R, W> {
    pub fn new(processor: &'p BatchProcessor<'c, E>, input: R, output: W) -> Self {
        Self {
            processor,
            input,
            output,
            recursive: true,
        }
    }

    /// Only scan the top level of selected folders.
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Run until the user quits or input ends; returns one report per batch run.
    pub fn run(&mut self) -> Result<Vec<BatchReport>> {
        let mut reports = Vec::new();
        writeln!(self.output, "PDF Article Cleaner")?;
        writeln!(self.output, "{}", RULE)?;

        loop {
            writeln!(self.output)?;
            writeln!(self.output, "  1) Select PDF files")?;
            writeln!(self.output, "  2) Select a folder")?;
            writeln!(self.output, "  q) Quit")?;
            let Some(choice) = self.prompt("> ")? else {
                break;
            };

            match choice.as_str() {
                "1" => {
                    if let Some(report) = self.select_files()? {
                        reports.push(report);
                    }
                },
                "2" => {
                    if let Some(report) = self.select_folder()? {
                        reports.push(report);
                    }
                },
                "q" | "Q" | "quit" | "exit" => break,
                "" => {},
                other => writeln!(self.output, "Unknown choice '{}'", other)?,
            }
        }

        writeln!(self.output, "Goodbye.")?;
        Ok(reports)
    }

    /// Print `label` and read one trimmed line; `None` at end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn select_files(&mut self) -> Result<Option<BatchReport>> {
        writeln!(self.output, "Enter PDF paths, one per line. Empty line to finish.")?;
        let mut files = Vec::new();
        while let Some(line) = self.prompt("file: ")? {
            if line.is_empty() {
                break;
            }
            files.push(PathBuf::from(unquote(&line)));
        }

        if files.is_empty() {
            writeln!(self.output, "No files selected.")?;
            return Ok(None);
        }
        self.list_selection(&files)?;

        let output = &mut self.output;
        let report = self.processor.run_files(&files, |p| log_progress(output, p));
        self.summarize(&report)?;
        Ok(Some(report))
    }

    fn select_folder(&mut self) -> Result<Option<BatchReport>> {
        let Some(line) = self.prompt("folder: ")? else {
            return Ok(None);
        };
        let folder = PathBuf::from(unquote(&line));

        let pdfs = match discover_pdfs(&folder, self.recursive) {
            Ok(pdfs) => pdfs,
            Err(err) => {
                writeln!(self.output, "✗ {}", err)?;
                return Ok(None);
            },
        };
        if pdfs.is_empty() {
            writeln!(self.output, "No PDF files found in {}", folder.display())?;
            return Ok(None);
        }
        self.list_selection(&pdfs)?;

        let output = &mut self.output;
        let report = self
            .processor
            .run_discovered(&folder, &pdfs, |p| log_progress(output, p))?;
        self.summarize(&report)?;
        Ok(Some(report))
    }

    fn list_selection(&mut self, files: &[PathBuf]) -> Result<()> {
        writeln!(self.output, "Selected {} file(s):", files.len())?;
        for file in files {
            writeln!(self.output, "  - {}", file.display())?;
        }
        writeln!(self.output)?;
        Ok(())
    }

    fn summarize(&mut self, report: &BatchReport) -> Result<()> {
        writeln!(self.output, "{}", RULE)?;
        writeln!(
            self.output,
            "COMPLETE: {} successful, {} failed",
            report.succeeded, report.failed
        )?;
        writeln!(self.output, "{}", RULE)?;
        Ok(())
    }
}

fn log_progress<W: Write>(output: &mut W, progress: &Progress<'_>) {
    let name = progress.outcome.file_name();
    let line = if progress.outcome.is_success() {
        format!("[{}/{}] ✓ {}", progress.index, progress.total, name)
    } else {
        format!("[{}/{}] ✗ {} (failed)", progress.index, progress.total, name)
    };
    if let Err(e) = writeln!(output, "{}", line) {
        log::warn!("could not write progress: {}", e);
    }
}

/// Strip one pair of surrounding quotes, as terminals add when a path is dropped in.
fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|r| r.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}
