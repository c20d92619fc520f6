//! Markup document adapter.
//!
//! Turns XML text into a loose record tree in the spirit of generic
//! XML-to-object converters: leaf elements become text, elements with
//! children or attributes become records, and repeated siblings collapse
//! into a list. Callers must therefore expect any field to be a single
//! value *or* a list.

mod parser;

pub use parser::parse_document;

/// A parsed document: the root element name and its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root_name: String,
    root: Value,
}

impl Document {
    pub fn new(root_name: impl Into<String>, root: Value) -> Self {
        Self {
            root_name: root_name.into(),
            root,
        }
    }

    /// Local name of the root element.
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Value of the root element.
    pub fn root(&self) -> &Value {
        &self.root
    }
}

/// A node of the record tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Element without children or attributes.
    Text(String),
    /// Element with children and/or attributes.
    Record(Record),
    /// Repeated sibling elements sharing a name.
    List(Vec<Value>),
}

impl Value {
    /// The record behind this value, if it is one.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Text content of a leaf, or the text held by a record.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            Value::Record(record) => Some(record.text()),
            Value::List(_) => None,
        }
    }

    /// Follow a chain of field names through nested records.
    ///
    /// Any step that is missing or not a record ends the walk with `None`.
    pub fn path(&self, path: &[&str]) -> Option<&Value> {
        let mut current = self;
        for name in path {
            current = current.as_record()?.get(name)?;
        }
        Some(current)
    }
}

/// Fields and attributes of one element, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    attributes: Vec<(String, String)>,
    fields: Vec<(String, Value)>,
    text: String,
}

impl Record {
    /// Field value by element name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Attribute value by local name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text content found directly inside the element.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Field names in source order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.attributes.is_empty()
    }

    pub(crate) fn push_attribute(&mut self, name: String, value: String) {
        self.attributes.push((name, value));
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Add a child value; a second child with the same name turns the
    /// field into a list.
    pub(crate) fn insert(&mut self, name: String, value: Value) {
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, Value::List(items))) => items.push(value),
            Some((_, existing)) => {
                let first = std::mem::replace(existing, Value::List(Vec::new()));
                *existing = Value::List(vec![first, value]);
            }
            None => self.fields.push((name, value)),
        }
    }

    /// Collapse an element without children or attributes into text.
    pub(crate) fn into_value(self) -> Value {
        if self.is_empty() {
            Value::Text(self.text)
        } else {
            Value::Record(self)
        }
    }
}
