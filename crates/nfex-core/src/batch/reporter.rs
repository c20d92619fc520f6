//! Observers for batch progress.

use std::path::Path;

use tracing::{error, info};

use crate::error::{DocumentError, ReportError};
use crate::models::invoice::LineItem;
use crate::report::WriteOutcome;

/// Something that happened during a batch run.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// Matching documents were found in the input directory.
    DocumentsFound { dir: &'a Path, count: usize },
    /// The input directory holds no matching document.
    NoDocuments { dir: &'a Path },
    /// Extraction of a document is starting.
    DocumentStarted { path: &'a Path },
    /// Line items were extracted from a document.
    DocumentExtracted { path: &'a Path, items: &'a [LineItem] },
    /// A document yielded no line items and was skipped.
    DocumentEmpty { path: &'a Path },
    /// A document could not be read or extracted.
    DocumentFailed { path: &'a Path, error: &'a DocumentError },
    /// A document's rows were written to the report.
    ReportWritten {
        document: &'a Path,
        report: &'a Path,
        outcome: WriteOutcome,
    },
    /// Writing a document's rows failed.
    ReportFailed {
        document: &'a Path,
        report: &'a Path,
        error: &'a ReportError,
    },
}

/// Receives batch events.
pub trait Reporter {
    fn report(&mut self, event: BatchEvent<'_>);
}

/// Forwards batch events to `tracing`.
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&mut self, event: BatchEvent<'_>) {
        match event {
            BatchEvent::DocumentsFound { dir, count } => {
                info!("Found {} documents in {}", count, dir.display());
            }
            BatchEvent::NoDocuments { dir } => {
                info!("No documents found in {}", dir.display());
            }
            BatchEvent::DocumentStarted { path } => {
                info!("Processing {}", path.display());
            }
            BatchEvent::DocumentExtracted { path, items } => {
                info!("Extracted {} line items from {}", items.len(), path.display());
            }
            BatchEvent::DocumentEmpty { path } => {
                info!("No line items found in {}, skipped", path.display());
            }
            BatchEvent::DocumentFailed { path, error } => {
                error!("Failed to extract {}: {}", path.display(), error);
            }
            BatchEvent::ReportWritten { report, outcome, .. } => {
                info!(
                    "Report {} now has {} rows ({} added)",
                    report.display(),
                    outcome.rows_total,
                    outcome.rows_added
                );
            }
            BatchEvent::ReportFailed { document, error, .. } => {
                error!("Failed to write rows of {}: {}", document.display(), error);
            }
        }
    }
}
