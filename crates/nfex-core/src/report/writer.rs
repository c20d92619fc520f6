//! Report creation and appending.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{Report, WriteMode, read_report, render_report};
use crate::error::ReportError;
use crate::models::invoice::LineItem;

/// Rows affected by one write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Rows added by this write.
    pub rows_added: usize,
    /// Data rows in the report after the write.
    pub rows_total: usize,
}

/// Writes line items to a report file.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    path: PathBuf,
    mode: WriteMode,
}

impl ReportWriter {
    pub fn new(path: impl Into<PathBuf>, mode: WriteMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Write items using the configured mode.
    pub fn write(&self, items: &[LineItem]) -> Result<WriteOutcome, ReportError> {
        self.write_with_mode(items, self.mode)
    }

    /// Write items using an explicit mode.
    pub fn write_with_mode(
        &self,
        items: &[LineItem],
        mode: WriteMode,
    ) -> Result<WriteOutcome, ReportError> {
        let mut report = match mode {
            WriteMode::Append if self.path.exists() => {
                debug!("Appending to existing report {}", self.path.display());
                read_report(&self.path)?
            }
            _ => Report::new(),
        };

        report.extend(items);
        self.persist(&report)?;

        info!(
            "Wrote {} rows to {} ({} total)",
            items.len(),
            self.path.display(),
            report.len()
        );

        Ok(WriteOutcome {
            rows_added: items.len(),
            rows_total: report.len(),
        })
    }

    /// Write to a temporary file next to the target, then rename it over
    /// the target. An existing target keeps its permissions.
    fn persist(&self, report: &Report) -> Result<(), ReportError> {
        let write_err = |source| ReportError::Write {
            path: self.path.clone(),
            source,
        };

        let bytes = render_report(report, &self.path)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_err)?;

        let existing = fs::metadata(&self.path).ok().map(|meta| meta.permissions());
        let mut tmp = temp_builder().tempfile_in(dir).map_err(write_err)?;
        tmp.write_all(&bytes).map_err(write_err)?;
        tmp.flush().map_err(write_err)?;
        if let Some(permissions) = existing {
            fs::set_permissions(tmp.path(), permissions).map_err(write_err)?;
        }

        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

/// Temporary files are created with the mode of a fresh report (0644 less
/// the umask) rather than the private 0600 default.
#[cfg(unix)]
fn temp_builder() -> tempfile::Builder<'static, 'static> {
    use std::os::unix::fs::PermissionsExt;

    let mut builder = tempfile::Builder::new();
    builder
        .prefix(".nfex")
        .permissions(fs::Permissions::from_mode(0o644));
    builder
}

#[cfg(not(unix))]
fn temp_builder() -> tempfile::Builder<'static, 'static> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".nfex");
    builder
}
