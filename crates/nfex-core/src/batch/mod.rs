//! Sequential batch processing of an input directory.

mod reporter;

pub use reporter::{BatchEvent, Reporter, TracingReporter};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{NfexError, Result};
use crate::invoice::{Classifier, NfeExtractor};
use crate::models::config::NfexConfig;
use crate::report::{OverwriteScope, ReportWriter, WriteMode};

/// Counters for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Matching documents in the input directory.
    pub documents_found: usize,
    /// Documents whose rows reached the report.
    pub documents_written: usize,
    /// Documents without line items.
    pub documents_empty: usize,
    /// Documents that could not be read or extracted.
    pub documents_failed: usize,
    /// Documents whose rows could not be written.
    pub writes_failed: usize,
    /// Rows added to the report during the run.
    pub rows_written: usize,
}

impl BatchSummary {
    /// Documents that did not make it into the report.
    pub fn skipped(&self) -> usize {
        self.documents_empty + self.documents_failed + self.writes_failed
    }
}

/// One configured pipeline run: discover, extract, classify, write.
#[derive(Debug, Clone)]
pub struct Batch {
    input_dir: PathBuf,
    extension: String,
    extractor: NfeExtractor,
    writer: ReportWriter,
    overwrite_scope: OverwriteScope,
}

impl Batch {
    pub fn new(
        input_dir: impl Into<PathBuf>,
        extension: &str,
        extractor: NfeExtractor,
        writer: ReportWriter,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            extension: extension.trim_start_matches('.').to_string(),
            extractor,
            writer,
            overwrite_scope: OverwriteScope::Document,
        }
    }

    /// Build a batch from validated configuration.
    pub fn from_config(config: &NfexConfig) -> Result<Self> {
        config.validate()?;

        let extractor = NfeExtractor::new()
            .with_classifier(Classifier::new(&config.classification.asset_keywords));
        let writer = ReportWriter::new(config.report_path(), config.report.mode);

        Ok(Self::new(&config.input.dir, &config.input.extension, extractor, writer)
            .with_overwrite_scope(config.report.overwrite_scope))
    }

    /// Set what an overwrite replaces.
    pub fn with_overwrite_scope(mut self, scope: OverwriteScope) -> Self {
        self.overwrite_scope = scope;
        self
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn report_path(&self) -> &Path {
        self.writer.path()
    }

    /// Matching documents of the input directory, in file-name order.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        discover_documents(&self.input_dir, &self.extension)
    }

    /// Process every document in turn.
    ///
    /// Only a failure to list the input directory is returned as an error;
    /// per-document failures are reported and the run continues.
    pub fn run(&self, reporter: &mut dyn Reporter) -> Result<BatchSummary> {
        let documents = self.discover()?;
        let mut summary = BatchSummary {
            documents_found: documents.len(),
            ..Default::default()
        };

        if documents.is_empty() {
            reporter.report(BatchEvent::NoDocuments {
                dir: &self.input_dir,
            });
            return Ok(summary);
        }

        reporter.report(BatchEvent::DocumentsFound {
            dir: &self.input_dir,
            count: documents.len(),
        });

        let mut wrote_this_run = false;
        for path in &documents {
            reporter.report(BatchEvent::DocumentStarted { path });

            let items = match self.extractor.extract_file(path) {
                Ok(items) => items,
                Err(error) => {
                    summary.documents_failed += 1;
                    reporter.report(BatchEvent::DocumentFailed { path, error: &error });
                    continue;
                }
            };

            if items.is_empty() {
                summary.documents_empty += 1;
                reporter.report(BatchEvent::DocumentEmpty { path });
                continue;
            }

            reporter.report(BatchEvent::DocumentExtracted { path, items: &items });

            let mode = self.effective_mode(wrote_this_run);
            match self.writer.write_with_mode(&items, mode) {
                Ok(outcome) => {
                    wrote_this_run = true;
                    summary.documents_written += 1;
                    summary.rows_written += outcome.rows_added;
                    reporter.report(BatchEvent::ReportWritten {
                        document: path,
                        report: self.writer.path(),
                        outcome,
                    });
                }
                Err(error) => {
                    summary.writes_failed += 1;
                    reporter.report(BatchEvent::ReportFailed {
                        document: path,
                        report: self.writer.path(),
                        error: &error,
                    });
                }
            }
        }

        debug!("Batch finished: {:?}", summary);
        Ok(summary)
    }

    fn effective_mode(&self, wrote_this_run: bool) -> WriteMode {
        match (self.writer.mode(), self.overwrite_scope) {
            (WriteMode::Overwrite, OverwriteScope::Run) if wrote_this_run => WriteMode::Append,
            (mode, _) => mode,
        }
    }
}

/// List regular files in `dir` whose extension matches, ignoring case.
pub fn discover_documents(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let dir_err = |source| NfexError::Directory {
        path: dir.to_path_buf(),
        source,
    };

    let extension = extension.trim_start_matches('.');
    let mut documents = Vec::new();
    for entry in fs::read_dir(dir).map_err(dir_err)? {
        let path = entry.map_err(dir_err)?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if matches && path.is_file() {
            documents.push(path);
        }
    }

    documents.sort();
    debug!("Discovered {} documents in {}", documents.len(), dir.display());
    Ok(documents)
}
