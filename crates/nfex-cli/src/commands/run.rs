//! Run command - build the report from an input directory.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use nfex_core::batch::{Batch, BatchEvent, BatchSummary, Reporter};
use nfex_core::report::{OverwriteScope, ReportFormat, WriteMode};

use super::config::load_config;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Directory containing the invoice XML files
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Directory the report is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Report file name
    #[arg(short = 'f', long)]
    output_file: Option<String>,

    /// Replace the report or append to it
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// In overwrite mode, replace per document or once per run
    #[arg(long, value_enum)]
    scope: Option<ScopeArg>,

    /// Report format; replaces the extension of the report file name
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Document file extension
    #[arg(short, long)]
    extension: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ModeArg {
    /// Create the report from scratch
    Overwrite,
    /// Keep existing rows and add new ones
    Append,
}

impl From<ModeArg> for WriteMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Overwrite => WriteMode::Overwrite,
            ModeArg::Append => WriteMode::Append,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ScopeArg {
    /// Each document replaces the report
    Document,
    /// The run replaces the report once
    Run,
}

impl From<ScopeArg> for OverwriteScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Document => OverwriteScope::Document,
            ScopeArg::Run => OverwriteScope::Run,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum FormatArg {
    /// Excel workbook
    Xlsx,
    /// CSV with a UTF-8 byte order mark
    Csv,
}

impl From<FormatArg> for ReportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Xlsx => ReportFormat::Xlsx,
            FormatArg::Csv => ReportFormat::Csv,
        }
    }
}

/// Report file name with the extension of `format`.
fn with_format(file_name: &str, format: ReportFormat) -> String {
    Path::new(file_name)
        .with_extension(format.extension())
        .to_string_lossy()
        .into_owned()
}

/// Prints batch events to the console above a progress bar.
struct ConsoleReporter {
    pb: ProgressBar,
}

impl ConsoleReporter {
    fn out(&self, line: String) {
        self.pb.suspend(|| println!("{}", line));
    }

    fn err(&self, line: String) {
        self.pb.suspend(|| eprintln!("{}", line));
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, event: BatchEvent<'_>) {
        match event {
            BatchEvent::DocumentsFound { dir, count } => {
                self.pb.set_length(count as u64);
                self.out(format!(
                    "{} Found {} documents in {}",
                    style("ℹ").blue(),
                    count,
                    dir.display()
                ));
            }
            BatchEvent::NoDocuments { dir } => {
                self.out(format!(
                    "{} No XML documents found in {}",
                    style("ℹ").blue(),
                    dir.display()
                ));
            }
            BatchEvent::DocumentStarted { path } => {
                self.pb.set_message(file_name(path));
                self.out(format!("Extracting {}...", file_name(path)));
            }
            BatchEvent::DocumentExtracted { path, items } => {
                debug!("{} line items extracted from {}", items.len(), path.display());
            }
            BatchEvent::DocumentEmpty { path } => {
                self.out(format!(
                    "{} No line items found in {}, skipped",
                    style("⚠").yellow(),
                    file_name(path)
                ));
                self.pb.inc(1);
            }
            BatchEvent::DocumentFailed { path, error } => {
                self.err(format!(
                    "{} Failed to extract {}: {}",
                    style("✗").red(),
                    file_name(path),
                    error
                ));
                self.pb.inc(1);
            }
            BatchEvent::ReportWritten {
                document,
                report,
                outcome,
            } => {
                self.out(format!(
                    "{} {}: {} rows written to {} ({} total)",
                    style("✓").green(),
                    file_name(document),
                    outcome.rows_added,
                    report.display(),
                    outcome.rows_total
                ));
                self.pb.inc(1);
            }
            BatchEvent::ReportFailed {
                document, error, ..
            } => {
                self.err(format!(
                    "{} Failed to write rows of {}: {}",
                    style("✗").red(),
                    file_name(document),
                    error
                ));
                self.pb.inc(1);
            }
        }
    }
}

pub async fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration and apply overrides
    let mut config = load_config(config_path)?;
    if let Some(dir) = args.input_dir {
        config.input.dir = dir;
    }
    if let Some(dir) = args.output_dir {
        config.report.dir = dir;
    }
    if let Some(name) = args.output_file {
        config.report.file_name = name;
    }
    if let Some(format) = args.format {
        config.report.file_name = with_format(&config.report.file_name, format.into());
    }
    if let Some(mode) = args.mode {
        config.report.mode = mode.into();
    }
    if let Some(scope) = args.scope {
        config.report.overwrite_scope = scope.into();
    }
    if let Some(extension) = args.extension {
        config.input.extension = extension;
    }

    let batch = Batch::from_config(&config)?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let mut reporter = ConsoleReporter { pb };
    let result = batch.run(&mut reporter);
    reporter.pb.finish_and_clear();

    let summary = result?;
    if summary.documents_found > 0 {
        print_summary(&summary, &config.report_path(), start);
    }

    if config.report.mode == WriteMode::Overwrite
        && config.report.overwrite_scope == OverwriteScope::Document
        && summary.documents_written > 1
    {
        println!(
            "{} Overwrite mode kept only the rows of the last document. \
             Use --scope run or --mode append to keep every document.",
            style("ℹ").blue()
        );
    }

    Ok(())
}

fn print_summary(summary: &BatchSummary, report: &Path, start: Instant) {
    println!();
    println!(
        "{} Processed {} documents in {:?}",
        style("✓").green(),
        summary.documents_found,
        start.elapsed()
    );
    println!(
        "   {} written, {} empty, {} failed",
        style(summary.documents_written).green(),
        style(summary.documents_empty).yellow(),
        style(summary.documents_failed + summary.writes_failed).red()
    );
    if summary.documents_written > 0 {
        println!("   Report: {}", report.display());
    }
}
