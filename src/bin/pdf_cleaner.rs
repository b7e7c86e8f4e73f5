//! Clean academic PDF articles into DOCX files of body text.
//!
//! Usage:
//!   pdf_cleaner paper1.pdf paper2.pdf
//!   pdf_cleaner --folder ~/papers
//!   pdf_cleaner                       (interactive)

use clap::Parser;
use pdf_article_cleaner::batch::{BatchProcessor, BatchReport, FileStatus, Progress};
use pdf_article_cleaner::interactive::InteractiveSession;
use pdf_article_cleaner::{CleaningRuleSet, LopdfExtractor, TextCleaner};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

const EPILOG: &str = "\
Examples:
  pdf_cleaner article.pdf                  Clean a single file
  pdf_cleaner a.pdf b.pdf c.pdf            Clean several files
  pdf_cleaner --folder ./papers            Clean every PDF under a folder
  pdf_cleaner -f ./papers --shallow        Only the top level of the folder
  pdf_cleaner --print-rules > rules.json   Dump the default rule set
  pdf_cleaner --rules rules.json -f ./p    Clean with an edited rule set
  pdf_cleaner                              Interactive mode

Cleaned files are written to a 'cleaned_articles' folder next to the inputs
as <name>_cleaned.docx. Set RUST_LOG=debug to see rule activity.";

#[derive(Parser, Debug)]
#[command(
    name = "pdf_cleaner",
    version,
    about = "Strip metadata, headers and references from academic PDFs",
    after_help = EPILOG
)]
struct Cli {
    /// PDF files to clean
    #[arg(value_name = "FILE", conflicts_with = "folder")]
    files: Vec<PathBuf>,

    /// Clean every PDF in this folder
    #[arg(short, long, value_name = "DIR")]
    folder: Option<PathBuf>,

    /// Do not descend into subfolders
    #[arg(long)]
    shallow: bool,

    /// Load the cleaning rule set from a JSON file
    #[arg(long, value_name = "JSON")]
    rules: Option<PathBuf>,

    /// Minimum length of a lowercase-initial line to be kept
    #[arg(long, value_name = "N")]
    min_line_length: Option<usize>,

    /// Minimum characters of cleaned text for a file to succeed
    #[arg(long, value_name = "N")]
    min_chars: Option<usize>,

    /// Print the effective rule set as JSON and exit
    #[arg(long)]
    print_rules: bool,

    /// Write the batch report as JSON
    #[arg(long, value_name = "JSON")]
    report: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}

fn load_rules(cli: &Cli) -> pdf_article_cleaner::Result<CleaningRuleSet> {
    let mut rules = match &cli.rules {
        Some(path) => CleaningRuleSet::from_json_file(path)?,
        None => CleaningRuleSet::default(),
    };
    if let Some(n) = cli.min_line_length {
        rules = rules.with_min_body_line_length(n);
    }
    if let Some(n) = cli.min_chars {
        rules = rules.with_min_content_chars(n);
    }
    Ok(rules)
}

fn run(cli: Cli) -> pdf_article_cleaner::Result<ExitCode> {
    let rules = load_rules(&cli)?;
    let cleaner = TextCleaner::new(&rules)?;

    if cli.print_rules {
        println!("{}", rules.to_json()?);
        return Ok(ExitCode::SUCCESS);
    }

    let processor = BatchProcessor::new(LopdfExtractor::from_rules(&rules), &cleaner);

    let report = if let Some(folder) = &cli.folder {
        println!("Scanning {}", folder.display());
        let report = processor.run_folder(folder, !cli.shallow, print_progress)?;
        if report.is_empty() {
            eprintln!("No PDF files found in {}", folder.display());
            return Ok(ExitCode::FAILURE);
        }
        report
    } else if !cli.files.is_empty() {
        println!("Processing {} file(s)", cli.files.len());
        processor.run_files(&cli.files, print_progress)
    } else {
        let stdin = io::stdin();
        InteractiveSession::new(&processor, stdin.lock(), io::stdout())
            .with_recursive(!cli.shallow)
            .run()?;
        return Ok(ExitCode::SUCCESS);
    };

    print_summary(&report);

    if let Some(path) = &cli.report {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!("Report saved to: {}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}

fn print_progress(progress: &Progress<'_>) {
    let outcome = progress.outcome;
    match &outcome.status {
        FileStatus::Succeeded { output } => println!(
            "[{}/{}] ✓ {} -> {}",
            progress.index,
            progress.total,
            outcome.file_name(),
            output.display()
        ),
        FileStatus::Failed { reason } => println!(
            "[{}/{}] ✗ {} ({})",
            progress.index,
            progress.total,
            outcome.file_name(),
            reason
        ),
    }
}

fn print_summary(report: &BatchReport) {
    let rule = "=".repeat(70);
    println!("\n{}", rule);
    println!("Total:      {}", report.total());
    println!("Succeeded:  {}", report.succeeded);
    println!("Failed:     {}", report.failed);
    println!("{}", rule);
}
