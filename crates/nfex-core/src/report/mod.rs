//! Tabular line-item report stored as an xlsx workbook or a CSV file.

mod delimited;
mod workbook;
mod writer;

pub use writer::{ReportWriter, WriteOutcome};

use std::path::Path;

use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::models::invoice::LineItem;

/// Fixed report header, in column order.
pub const REPORT_HEADER: [&str; 10] = [
    "Número da Nota",
    "Emitente",
    "Data de Emissão",
    "Tipo (Produto/Serviço)",
    "Nome do Produto/Serviço",
    "Classificação",
    "Quantidade",
    "Unidade",
    "Valor Unitário",
    "Valor Total",
];

/// Worksheet holding the rows of an xlsx report.
pub const SHEET_NAME: &str = "NFe Data";

/// On-disk encoding of a report, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Office Open XML workbook with a single sheet.
    Xlsx,
    /// UTF-8 CSV with a byte order mark.
    Csv,
}

impl ReportFormat {
    /// Format for an extension, ignoring case and a leading dot.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.trim_start_matches('.');
        if extension.eq_ignore_ascii_case("xlsx") {
            Some(Self::Xlsx)
        } else if extension.eq_ignore_ascii_case("csv") {
            Some(Self::Csv)
        } else {
            None
        }
    }

    /// File extension written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    /// Format for a report path; anything but `.csv` is a workbook.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .unwrap_or(Self::Xlsx)
    }
}

/// How new rows meet an existing report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Replace the report with a fresh one.
    #[default]
    Overwrite,
    /// Keep existing rows and add new ones at the end.
    Append,
}

/// What a batch run in overwrite mode replaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwriteScope {
    /// Every document replaces the report; the last one wins.
    #[default]
    Document,
    /// The first write of a run replaces the report, later ones append.
    Run,
}

/// In-memory report: header plus data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub header: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl Report {
    /// Empty report with the fixed header.
    pub fn new() -> Self {
        Self {
            header: REPORT_HEADER.into_iter().collect(),
            rows: Vec::new(),
        }
    }

    /// Append one row per line item.
    pub fn extend(&mut self, items: &[LineItem]) {
        self.rows.extend(
            items
                .iter()
                .map(|item| item.to_row().into_iter().collect::<StringRecord>()),
        );
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a report back from disk, in the format its extension names.
///
/// The header must have the fixed column count; its text is kept as found.
pub fn read_report(path: &Path) -> Result<Report, ReportError> {
    let report = match ReportFormat::from_path(path) {
        ReportFormat::Xlsx => workbook::read(path)?,
        ReportFormat::Csv => delimited::read(path)?,
    };

    if report.header.len() != REPORT_HEADER.len() {
        return Err(ReportError::Format {
            path: path.to_path_buf(),
            expected: REPORT_HEADER.len(),
            found: report.header.len(),
        });
    }
    Ok(report)
}

/// Encode a report for `path`.
pub(crate) fn render_report(report: &Report, path: &Path) -> Result<Vec<u8>, ReportError> {
    match ReportFormat::from_path(path) {
        ReportFormat::Xlsx => workbook::render(report, path),
        ReportFormat::Csv => delimited::render(report, path),
    }
}
