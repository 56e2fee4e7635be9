use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::analysis::token::Token;
use crate::core::error::{Error, ErrorKind, Result};

/// Open per-token metadata: arbitrary keys to arbitrary JSON values.
pub type Metadata = IndexMap<String, serde_json::Value>;

/// A single field value extracted from a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Text(String),
    Number(f64),
    Boolean(bool),
    /// A pre-built token, passed through the tokenizer unsplit.
    Token(Token),
    /// Each element becomes one token; elements are never re-split.
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Surface string used when a value is indexed or referenced.
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Token(t) => t.text.clone(),
            FieldValue::List(items) => items
                .iter()
                .map(FieldValue::to_text)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// Document representation: a bag of named field values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub fields: IndexMap<String, FieldValue>,
}

impl Document {
    pub fn new() -> Self {
        Document {
            fields: IndexMap::new(),
        }
    }

    pub fn add_field(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.add_field(name, value);
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// Composite key identifying one field of one document.
///
/// Serialized as `fieldName/docRef`, which is why `/` is banned in
/// field names. The doc ref itself may contain `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub doc_ref: String,
    pub field_name: String,
}

pub const FIELD_REF_JOINER: char = '/';

impl FieldRef {
    pub fn new(doc_ref: impl Into<String>, field_name: impl Into<String>) -> Self {
        FieldRef {
            doc_ref: doc_ref.into(),
            field_name: field_name.into(),
        }
    }

    pub fn from_string(s: &str) -> Result<Self> {
        let n = s.find(FIELD_REF_JOINER).ok_or_else(|| {
            Error::new(
                ErrorKind::MalformedFieldRef,
                format!("malformed field ref string '{}'", s),
            )
        })?;

        Ok(FieldRef {
            field_name: s[..n].to_string(),
            doc_ref: s[n + 1..].to_string(),
        })
    }
}

impl std::fmt::Display for FieldRef {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}{}", self.field_name, FIELD_REF_JOINER, self.doc_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_ref_round_trip() {
        let fr = FieldRef::new("doc-1", "title");
        assert_eq!(fr.to_string(), "title/doc-1");

        let parsed = FieldRef::from_string("title/doc-1").unwrap();
        assert_eq!(parsed, fr);
    }

    #[test]
    fn test_field_ref_doc_ref_may_contain_joiner() {
        let parsed = FieldRef::from_string("body/a/b/c").unwrap();
        assert_eq!(parsed.field_name, "body");
        assert_eq!(parsed.doc_ref, "a/b/c");
    }

    #[test]
    fn test_field_ref_malformed() {
        let err = FieldRef::from_string("no-joiner").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedFieldRef);
    }

    #[test]
    fn test_field_value_to_text() {
        assert_eq!(FieldValue::Number(5.0).to_text(), "5");
        assert_eq!(FieldValue::Number(5.5).to_text(), "5.5");
        assert_eq!(FieldValue::Boolean(true).to_text(), "true");
        assert_eq!(FieldValue::Null.to_text(), "");
    }
}
