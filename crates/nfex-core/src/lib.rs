//! Core library for NF-e line-item reports.
//!
//! This crate provides:
//! - XML document parsing into a loose record tree
//! - NF-e line-item extraction with product/service detection
//! - Keyword classification of items as consumables or assets
//! - xlsx or CSV report writing in overwrite or append mode
//! - A sequential batch driver with pluggable progress reporting

pub mod batch;
pub mod document;
pub mod error;
pub mod invoice;
pub mod models;
pub mod report;

pub use batch::{Batch, BatchEvent, BatchSummary, Reporter, TracingReporter};
pub use document::{Document, Record, Value, parse_document};
pub use error::{DocumentError, NfexError, ParseError, ReportError, Result};
pub use invoice::{Classifier, InvoiceExtractor, NfeExtractor, classify};
pub use models::config::NfexConfig;
pub use models::invoice::{Category, ItemKind, LineItem};
pub use report::{
    OverwriteScope, Report, ReportFormat, ReportWriter, WriteMode, WriteOutcome, read_report,
};
