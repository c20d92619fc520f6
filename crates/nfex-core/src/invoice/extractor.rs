//! NF-e field extraction over the parsed record tree.

use std::path::Path;

use tracing::{debug, info};

use crate::document::{Document, Value, parse_document};
use crate::error::DocumentError;
use crate::models::invoice::{ItemKind, LineItem};

use super::classifier::Classifier;
use super::{InvoiceExtractor, Result};

/// Root element of an authorized NF-e (invoice plus protocol).
const PROCESS_ROOT: &str = "nfeProc";

/// Extracts line items from `nfeProc` documents.
#[derive(Debug, Clone, Default)]
pub struct NfeExtractor {
    classifier: Classifier,
}

impl NfeExtractor {
    /// Create an extractor with the default keyword classifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom classifier.
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Read, parse and extract one document file.
    pub fn extract_file(&self, path: &Path) -> Result<Vec<LineItem>> {
        let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Extracting line items from {}", path.display());
        self.extract_from_text(&text)
    }
}

impl InvoiceExtractor for NfeExtractor {
    fn extract(&self, document: &Document) -> Result<Vec<LineItem>> {
        let Some(invoice) = InvoiceView::locate(document)? else {
            debug!("Document root <{}> holds no invoice", document.root_name());
            return Ok(Vec::new());
        };

        let invoice_number = invoice.invoice_number();
        let emission_date = invoice.emission_date();
        let issuer_name = invoice.issuer_name();

        let items: Vec<LineItem> = invoice
            .items()
            .into_iter()
            .map(|item| {
                let description = item.description();
                LineItem {
                    invoice_number: invoice_number.clone(),
                    emission_date: emission_date.clone(),
                    issuer_name: issuer_name.clone(),
                    kind: item.kind(),
                    category: self.classifier.classify(&description),
                    description,
                    quantity: item.quantity(),
                    unit: item.unit(),
                    unit_value: item.unit_value(),
                    total_value: item.total_value(),
                }
            })
            .collect();

        debug!("Extracted {} line items from invoice {:?}", items.len(), invoice_number);
        Ok(items)
    }

    fn extract_from_text(&self, text: &str) -> Result<Vec<LineItem>> {
        let document = parse_document(text)?;
        self.extract(&document)
    }
}

/// Normalize a field that may be absent, a single value, or a list of
/// values into a sequence.
pub fn normalize_items(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None => Vec::new(),
        Some(Value::List(items)) => items.iter().collect(),
        Some(single) => vec![single],
    }
}

/// Text of an optional field; missing fields read as the empty string.
fn text_or_empty(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_text)
        .map(|text| text.to_string())
        .unwrap_or_default()
}

/// The `infNFe` record of a document.
struct InvoiceView<'a> {
    inf: &'a Value,
}

impl<'a> InvoiceView<'a> {
    /// Walk `nfeProc/NFe/infNFe`. A missing step means no invoice; a
    /// duplicated step is a broken document.
    fn locate(document: &'a Document) -> Result<Option<Self>> {
        if document.root_name() != PROCESS_ROOT {
            return Ok(None);
        }

        let mut current = document.root();
        for step in ["NFe", "infNFe"] {
            match current.as_record().and_then(|record| record.get(step)) {
                Some(Value::List(items)) => {
                    return Err(DocumentError::Structure(format!(
                        "expected one <{step}>, found {}",
                        items.len()
                    )));
                }
                Some(value) => current = value,
                None => return Ok(None),
            }
        }

        Ok(Some(Self { inf: current }))
    }

    fn field(&self, path: &[&str]) -> String {
        text_or_empty(self.inf.path(path))
    }

    fn invoice_number(&self) -> String {
        self.field(&["ide", "nNF"])
    }

    fn emission_date(&self) -> String {
        self.field(&["ide", "dhEmi"])
    }

    fn issuer_name(&self) -> String {
        self.field(&["emit", "xNome"])
    }

    fn items(&self) -> Vec<ItemView<'a>> {
        let det = self.inf.as_record().and_then(|record| record.get("det"));
        normalize_items(det).into_iter().map(ItemView).collect()
    }
}

/// One `det` entry.
struct ItemView<'a>(&'a Value);

impl ItemView<'_> {
    fn product_field(&self, name: &str) -> String {
        text_or_empty(self.0.path(&["prod", name]))
    }

    fn kind(&self) -> ItemKind {
        if self.0.path(&["imposto", "ISSQN"]).is_some() {
            ItemKind::Service
        } else {
            ItemKind::Product
        }
    }

    fn description(&self) -> String {
        self.product_field("xProd")
    }

    fn quantity(&self) -> String {
        self.product_field("qCom")
    }

    fn unit(&self) -> String {
        self.product_field("uCom")
    }

    fn unit_value(&self) -> String {
        self.product_field("vUnCom")
    }

    fn total_value(&self) -> String {
        self.product_field("vProd")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::Category;
    use pretty_assertions::assert_eq;

    fn nfe(header: &str, items: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <nfeProc versao="4.00" xmlns="http://www.portalfiscal.inf.br/nfe">
              <NFe>
                <infNFe Id="NFe35240100000000000000550010000001231000001234" versao="4.00">
                  {header}
                  {items}
                </infNFe>
              </NFe>
              <protNFe versao="4.00"><infProt><cStat>100</cStat></infProt></protNFe>
            </nfeProc>"#
        )
    }

    const HEADER: &str = r#"
        <ide><nNF>123</nNF><dhEmi>2024-01-15T10:00:00-03:00</dhEmi></ide>
        <emit><CNPJ>00000000000191</CNPJ><xNome>ACME</xNome></emit>"#;

    fn product(n: u32, name: &str) -> String {
        format!(
            r#"<det nItem="{n}">
                 <prod><xProd>{name}</xProd><qCom>2.0000</qCom><uCom>UN</uCom>
                   <vUnCom>10.00</vUnCom><vProd>20.00</vProd></prod>
                 <imposto><ICMS><ICMS00><CST>00</CST></ICMS00></ICMS></imposto>
               </det>"#
        )
    }

    fn service(n: u32, name: &str) -> String {
        format!(
            r#"<det nItem="{n}">
                 <prod><xProd>{name}</xProd><qCom>1.0000</qCom><uCom>HR</uCom>
                   <vUnCom>500.00</vUnCom><vProd>500.00</vProd></prod>
                 <imposto><ISSQN><vAliq>5.00</vAliq></ISSQN></imposto>
               </det>"#
        )
    }

    fn extract(xml: &str) -> Result<Vec<LineItem>> {
        NfeExtractor::new().extract_from_text(xml)
    }

    #[test]
    fn test_extract_products_and_services() {
        let items = format!("{}{}", product(1, "Notebook hardware"), service(2, "Consultoria"));
        let result = extract(&nfe(HEADER, &items)).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(
            result[0],
            LineItem {
                invoice_number: "123".to_string(),
                emission_date: "2024-01-15T10:00:00-03:00".to_string(),
                issuer_name: "ACME".to_string(),
                kind: ItemKind::Product,
                description: "Notebook hardware".to_string(),
                quantity: "2.0000".to_string(),
                unit: "UN".to_string(),
                unit_value: "10.00".to_string(),
                total_value: "20.00".to_string(),
                category: Category::Asset,
            }
        );
        assert_eq!(result[1].kind, ItemKind::Service);
        assert_eq!(result[1].category, Category::Consumable);
        assert_eq!(result[1].description, "Consultoria");
    }

    #[test]
    fn test_every_item_carries_header_fields() {
        let items: String = (1..=5).map(|n| product(n, &format!("Item {n}"))).collect();
        let result = extract(&nfe(HEADER, &items)).unwrap();

        assert_eq!(result.len(), 5);
        for (i, item) in result.iter().enumerate() {
            assert_eq!(item.invoice_number, "123");
            assert_eq!(item.issuer_name, "ACME");
            assert_eq!(item.description, format!("Item {}", i + 1));
        }
    }

    #[test]
    fn test_single_item_yields_one_line() {
        let result = extract(&nfe(HEADER, &product(1, "Papel A4"))).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].category, Category::Consumable);
    }

    #[test]
    fn test_missing_item_field_yields_nothing() {
        assert!(extract(&nfe(HEADER, "")).unwrap().is_empty());
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let result = extract(&nfe("", "<det><prod><xProd>Caneta</xProd></prod></det>")).unwrap();
        assert_eq!(result.len(), 1);
        let item = &result[0];
        assert_eq!(item.invoice_number, "");
        assert_eq!(item.emission_date, "");
        assert_eq!(item.issuer_name, "");
        assert_eq!(item.description, "Caneta");
        assert_eq!(item.quantity, "");
        assert_eq!(item.total_value, "");
        assert_eq!(item.kind, ItemKind::Product);

        let result = extract(&nfe(HEADER, "<det/>")).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].description, "");
        assert_eq!(result[0].category, Category::Consumable);
    }

    #[test]
    fn test_field_text_is_copied_verbatim() {
        let det = "<det><prod><xProd>  Caneta azul </xProd><qCom> 2.0000</qCom></prod></det>";
        let result = extract(&nfe(HEADER, det)).unwrap();
        assert_eq!(result[0].description, "  Caneta azul ");
        assert_eq!(result[0].quantity, " 2.0000");
    }

    #[test]
    fn test_other_roots_are_empty() {
        let bare = "<NFe><infNFe><det><prod><xProd>X</xProd></prod></det></infNFe></NFe>";
        assert!(extract(bare).unwrap().is_empty());
        assert!(extract("<nfeProc/>").unwrap().is_empty());
        assert!(extract("<nfeProc><NFe>texto</NFe></nfeProc>").unwrap().is_empty());
    }

    #[test]
    fn test_duplicated_root_steps_are_errors() {
        let xml = "<nfeProc><NFe><infNFe/></NFe><NFe><infNFe/></NFe></nfeProc>";
        assert!(matches!(extract(xml), Err(DocumentError::Structure(_))));
    }

    #[test]
    fn test_malformed_markup_is_parse_error() {
        assert!(matches!(
            extract("<nfeProc><NFe></nfeProc>"),
            Err(DocumentError::Parse(_))
        ));
    }

    #[test]
    fn test_custom_classifier() {
        let extractor =
            NfeExtractor::new().with_classifier(Classifier::new(["consultoria"]));
        let result = extractor
            .extract_from_text(&nfe(HEADER, &service(1, "Consultoria")))
            .unwrap();
        assert_eq!(result[0].category, Category::Asset);
    }

    #[test]
    fn test_extract_file_reports_unreadable_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = NfeExtractor::new().extract_file(&dir.path().join("missing.xml"));
        assert!(matches!(result, Err(DocumentError::Read { .. })));
    }

    #[test]
    fn test_normalize_items() {
        let single = Value::Text("a".to_string());
        let list = Value::List(vec![
            Value::Text("a".to_string()),
            Value::Text("b".to_string()),
            Value::Text("c".to_string()),
        ]);

        assert!(normalize_items(None).is_empty());
        assert_eq!(normalize_items(Some(&single)), vec![&single]);
        assert_eq!(normalize_items(Some(&list)).len(), 3);
        assert_eq!(normalize_items(Some(&list))[2].as_text(), Some("c"));
    }
}
