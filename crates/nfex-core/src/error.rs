//! Error types for the nfex-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the nfex library.
#[derive(Error, Debug)]
pub enum NfexError {
    /// The input directory could not be listed.
    #[error("cannot list input directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single document could not be read or extracted.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// The report artifact could not be read or written.
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning markup text into a record tree.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The tokenizer rejected the input.
    #[error("malformed XML near byte {position}: {source}")]
    Syntax {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    /// An end tag does not close the innermost open element.
    #[error("mismatched end tag near byte {position}: expected </{expected}>, found </{found}>")]
    MismatchedTag {
        position: u64,
        expected: String,
        found: String,
    },

    /// An end tag appears with no element open.
    #[error("unmatched end tag </{found}> near byte {position}")]
    UnmatchedEndTag { position: u64, found: String },

    /// A second top-level element follows the root.
    #[error("second root element <{0}>")]
    MultipleRoots(String),

    /// The input ended while elements were still open.
    #[error("unexpected end of document, <{0}> is not closed")]
    UnclosedElement(String),

    /// The input holds no element at all.
    #[error("document has no root element")]
    NoRoot,
}

/// Errors related to a single invoice document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The document file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document text is not well-formed markup.
    #[error("failed to parse document: {0}")]
    Parse(#[from] ParseError),

    /// The invoice-process root is present but structurally broken.
    #[error("invalid document structure: {0}")]
    Structure(String),
}

/// Errors related to the tabular report artifact.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The existing CSV report could not be parsed.
    #[error("failed to read report {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The existing workbook could not be opened or read.
    #[error("failed to read workbook {}: {source}", path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },

    /// The report could not be encoded as a workbook.
    #[error("failed to build workbook {}: {source}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    /// The existing report does not have the expected column layout.
    #[error("unexpected report layout in {}: expected {expected} columns, found {found}", path.display())]
    Format {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    /// The report could not be written.
    #[error("failed to write report {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for the nfex library.
pub type Result<T> = std::result::Result<T, NfexError>;
