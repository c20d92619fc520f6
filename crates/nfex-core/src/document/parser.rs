//! XML to record-tree conversion using quick-xml.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::trace;

use super::{Document, Record, Value};
use crate::error::ParseError;

/// An element whose end tag has not been seen yet.
struct OpenElement {
    name: String,
    record: Record,
}

/// Parse XML text into a [`Document`].
pub fn parse_document(text: &str) -> Result<Document, ParseError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().check_end_names = false;

    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<(String, Value)> = None;
    let mut buf = Vec::new();

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|source| ParseError::Syntax { position, source })?;

        match event {
            Event::Start(e) => {
                let record = start_record(&e, position)?;
                stack.push(OpenElement {
                    name: local_name(&e),
                    record,
                });
            }
            Event::Empty(e) => {
                let name = local_name(&e);
                let value = start_record(&e, position)?.into_value();
                attach(&mut stack, &mut root, name, value)?;
            }
            Event::End(e) => {
                let found = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                let open = stack
                    .pop()
                    .ok_or_else(|| ParseError::UnmatchedEndTag {
                        position,
                        found: found.clone(),
                    })?;
                if open.name != found {
                    return Err(ParseError::MismatchedTag {
                        position,
                        expected: open.name,
                        found,
                    });
                }
                attach(&mut stack, &mut root, open.name, open.record.into_value())?;
            }
            Event::Text(e) => {
                if let Some(open) = stack.last_mut() {
                    let text = e
                        .unescape()
                        .map_err(|source| ParseError::Syntax { position, source })?;
                    // Indentation between elements is not content; real text
                    // keeps its surrounding whitespace.
                    if !text.trim().is_empty() {
                        open.record.push_text(&text);
                    }
                }
            }
            Event::CData(e) => {
                if let Some(open) = stack.last_mut() {
                    open.record.push_text(&String::from_utf8_lossy(&e));
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctypes.
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.pop() {
        return Err(ParseError::UnclosedElement(open.name));
    }

    let (root_name, value) = root.ok_or(ParseError::NoRoot)?;
    trace!("Parsed document with root <{}>", root_name);
    Ok(Document::new(root_name, value))
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn start_record(e: &BytesStart<'_>, position: u64) -> Result<Record, ParseError> {
    let mut record = Record::default();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ParseError::Syntax {
            position,
            source: err.into(),
        })?;
        let name = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        // Namespace declarations carry no invoice data.
        if name == "xmlns" || attr.key.as_ref().starts_with(b"xmlns:") {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|source| ParseError::Syntax { position, source })?;
        record.push_attribute(name, value.into_owned());
    }
    Ok(record)
}

fn attach(
    stack: &mut [OpenElement],
    root: &mut Option<(String, Value)>,
    name: String,
    value: Value,
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => parent.record.insert(name, value),
        None if root.is_none() => *root = Some((name, value)),
        None => return Err(ParseError::MultipleRoots(name)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_nested_records() {
        let doc = parse_document(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <nfeProc versao="4.00" xmlns="http://www.portalfiscal.inf.br/nfe">
                <NFe>
                    <infNFe Id="NFe123">
                        <ide><nNF>123</nNF></ide>
                    </infNFe>
                </NFe>
            </nfeProc>"#,
        )
        .unwrap();

        assert_eq!(doc.root_name(), "nfeProc");
        let root = doc.root().as_record().unwrap();
        assert_eq!(root.attribute("versao"), Some("4.00"));
        assert_eq!(root.attribute("xmlns"), None);

        let inf = doc.root().path(&["NFe", "infNFe"]).unwrap();
        assert_eq!(inf.as_record().unwrap().attribute("Id"), Some("NFe123"));
        assert_eq!(
            inf.path(&["ide", "nNF"]).and_then(Value::as_text),
            Some("123")
        );
    }

    #[test]
    fn test_repeated_siblings_become_list() {
        let doc = parse_document("<r><det>a</det><x/><det>b</det></r>").unwrap();
        let root = doc.root().as_record().unwrap();
        assert_eq!(
            root.get("det"),
            Some(&Value::List(vec![
                Value::Text("a".to_string()),
                Value::Text("b".to_string()),
            ]))
        );
        assert_eq!(root.get("x"), Some(&Value::Text(String::new())));
    }

    #[test]
    fn test_single_sibling_stays_single() {
        let doc = parse_document("<r><det><prod/></det></r>").unwrap();
        let det = doc.root().path(&["det"]).unwrap();
        assert!(det.as_record().is_some());
    }

    #[test]
    fn test_entities_cdata_and_prefixes() {
        let doc = parse_document(
            "<ns:r xmlns:ns=\"urn:x\"><ns:a>M&amp;M &lt;LTDA&gt;</ns:a><b><![CDATA[<raw>]]></b><!-- note --></ns:r>",
        )
        .unwrap();
        assert_eq!(doc.root_name(), "r");
        assert_eq!(doc.root().path(&["a"]).and_then(Value::as_text), Some("M&M <LTDA>"));
        assert_eq!(doc.root().path(&["b"]).and_then(Value::as_text), Some("<raw>"));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            parse_document("<a><b></a>"),
            Err(ParseError::MismatchedTag { .. })
        ));
        assert!(parse_document("<a><b>text</b>").is_err());
        assert!(matches!(parse_document(""), Err(ParseError::NoRoot)));
        assert!(matches!(
            parse_document("<a/><b/>"),
            Err(ParseError::MultipleRoots(name)) if name == "b"
        ));
        assert!(parse_document("<a x=1></a>").is_err());
        assert!(parse_document("not xml at all").is_err());
    }

    #[test]
    fn test_text_whitespace_is_kept() {
        let doc = parse_document(
            "<prod>\n  <xProd>  Caneta azul </xProd>\n  <qCom> 2.0000</qCom>\n  <uCom>   </uCom>\n</prod>",
        )
        .unwrap();
        let prod = doc.root().as_record().unwrap();
        assert_eq!(prod.field_names().collect::<Vec<_>>(), vec!["xProd", "qCom", "uCom"]);
        assert_eq!(prod.text(), "");
        assert_eq!(prod.get("xProd").and_then(Value::as_text), Some("  Caneta azul "));
        assert_eq!(prod.get("qCom").and_then(Value::as_text), Some(" 2.0000"));
        assert_eq!(prod.get("uCom").and_then(Value::as_text), Some(""));
    }
}
