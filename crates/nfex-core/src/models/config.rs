//! Configuration structures for the report pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::NfexError;
use crate::invoice::DEFAULT_ASSET_KEYWORDS;
use crate::report::{OverwriteScope, ReportFormat, WriteMode};

/// Main configuration for the nfex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NfexConfig {
    /// Input document discovery.
    pub input: InputConfig,

    /// Report artifact settings.
    pub report: ReportConfig,

    /// Item classification settings.
    pub classification: ClassificationConfig,
}

/// Where invoice documents are read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory scanned for documents.
    pub dir: PathBuf,

    /// File extension of documents, without the dot.
    pub extension: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("XML"),
            extension: "xml".to_string(),
        }
    }
}

/// Where and how the report is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output directory, created if missing.
    pub dir: PathBuf,

    /// Report file name inside `dir`; `.xlsx` or `.csv` picks the format.
    pub file_name: String,

    /// Overwrite or append.
    pub mode: WriteMode,

    /// What an overwrite replaces.
    pub overwrite_scope: OverwriteScope,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("PLANILHA"),
            file_name: "dados_nfe.xlsx".to_string(),
            mode: WriteMode::Overwrite,
            overwrite_scope: OverwriteScope::Document,
        }
    }
}

/// Keyword classification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Terms that mark an item as an asset (case-insensitive substring match).
    pub asset_keywords: Vec<String>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            asset_keywords: DEFAULT_ASSET_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl NfexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Full path of the report artifact.
    pub fn report_path(&self) -> PathBuf {
        self.report.dir.join(&self.report.file_name)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), NfexError> {
        if self.report.file_name.trim().is_empty() {
            return Err(NfexError::Config("report.file_name is empty".to_string()));
        }
        let extension = Path::new(&self.report.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        if ReportFormat::from_extension(extension).is_none() {
            return Err(NfexError::Config(format!(
                "report.file_name must end in .xlsx or .csv, got {:?}",
                self.report.file_name
            )));
        }
        if self.input.extension.trim_start_matches('.').is_empty() {
            return Err(NfexError::Config("input.extension is empty".to_string()));
        }
        if self.classification.asset_keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(NfexError::Config(
                "classification.asset_keywords has no usable keyword".to_string(),
            ));
        }
        Ok(())
    }
}
