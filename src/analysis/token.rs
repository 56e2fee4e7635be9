use serde::{Deserialize, Serialize};

use crate::core::types::Metadata;

/// One indexed unit: the surface string plus open metadata.
///
/// The tokenizer stamps `position` and `index` metadata; pipeline
/// functions may attach further keys. Whitelisted keys end up in the
/// inverted index postings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub metadata: Metadata,
}

impl Token {
    pub fn new(text: impl Into<String>, metadata: Metadata) -> Self {
        Token {
            text: text.into(),
            metadata,
        }
    }

    /// Apply a transform to the surface string in place.
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&str) -> String,
    {
        self.text = f(&self.text);
    }

    /// Copy of this token with `extra` metadata shallow-merged in.
    /// Keys in `extra` win over existing keys.
    pub fn clone_with_metadata(&self, extra: &Metadata) -> Token {
        let mut metadata = self.metadata.clone();
        for (key, value) in extra {
            metadata.insert(key.clone(), value.clone());
        }

        Token {
            text: self.text.clone(),
            metadata,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_replaces_text() {
        let mut token = Token::new("Walking", Metadata::new());
        token.update(|s| s.to_lowercase());
        assert_eq!(token.text, "walking");
    }

    #[test]
    fn test_clone_with_metadata_merges() {
        let mut base = Metadata::new();
        base.insert("index".to_string(), json!(0));

        let token = Token::new("fox", base);

        let mut extra = Metadata::new();
        extra.insert("fields".to_string(), json!(["title"]));
        extra.insert("index".to_string(), json!(3));

        let merged = token.clone_with_metadata(&extra);
        assert_eq!(merged.metadata["index"], json!(3));
        assert_eq!(merged.metadata["fields"], json!(["title"]));
    }
}
