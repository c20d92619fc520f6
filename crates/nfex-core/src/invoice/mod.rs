//! Invoice line-item extraction and classification.

mod classifier;
mod extractor;

pub use classifier::{Classifier, DEFAULT_ASSET_KEYWORDS, classify};
pub use extractor::{NfeExtractor, normalize_items};

use crate::document::Document;
use crate::error::DocumentError;
use crate::models::invoice::LineItem;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Trait for invoice line-item extractors.
pub trait InvoiceExtractor {
    /// Extract line items from a parsed document.
    fn extract(&self, document: &Document) -> Result<Vec<LineItem>>;

    /// Parse markup text and extract its line items.
    fn extract_from_text(&self, text: &str) -> Result<Vec<LineItem>>;
}
