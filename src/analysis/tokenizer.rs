use serde_json::json;

use crate::analysis::token::Token;
use crate::core::types::{FieldValue, Metadata};

/// Predicate deciding whether a character separates tokens.
pub type Separator = fn(char) -> bool;

/// Default separator: whitespace or hyphen.
pub fn default_separator(c: char) -> bool {
    c.is_whitespace() || c == '-'
}

/// Splits field values into tokens.
///
/// Scalar values are trimmed, lowercased and split on separator runs;
/// each token carries `position: [byte_start, byte_len]` into the
/// processed string and `index` (ordinal within the field). List values
/// yield one token per element without re-splitting.
#[derive(Clone, Copy, Debug)]
pub struct Tokenizer {
    pub separator: Separator,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer {
            separator: default_separator,
        }
    }
}

impl Tokenizer {
    pub fn new(separator: Separator) -> Self {
        Tokenizer { separator }
    }

    pub fn tokenize(&self, value: &FieldValue, metadata: &Metadata) -> Vec<Token> {
        match value {
            FieldValue::Null => Vec::new(),
            FieldValue::Token(token) => {
                let mut copy = token.clone_with_metadata(metadata);
                copy.update(|s| s.to_lowercase());
                vec![copy]
            }
            FieldValue::List(items) => items
                .iter()
                .map(|item| match item {
                    FieldValue::Token(token) => token.clone_with_metadata(metadata),
                    other => Token::new(other.to_text().to_lowercase(), metadata.clone()),
                })
                .collect(),
            scalar => self.split(&scalar.to_text(), metadata),
        }
    }

    fn split(&self, raw: &str, metadata: &Metadata) -> Vec<Token> {
        let text = raw.trim().to_lowercase();
        let mut tokens = Vec::new();
        let mut run_start: Option<usize> = None;

        let flush = |start: usize, end: usize, tokens: &mut Vec<Token>| {
            let mut token_metadata = metadata.clone();
            token_metadata.insert("position".to_string(), json!([start, end - start]));
            token_metadata.insert("index".to_string(), json!(tokens.len()));
            tokens.push(Token::new(&text[start..end], token_metadata));
        };

        for (offset, c) in text.char_indices() {
            if (self.separator)(c) {
                if let Some(start) = run_start.take() {
                    flush(start, offset, &mut tokens);
                }
            } else if run_start.is_none() {
                run_start = Some(offset);
            }
        }

        if let Some(start) = run_start {
            flush(start, text.len(), &mut tokens);
        }

        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_splits_on_whitespace_and_hyphen() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize(
            &FieldValue::Text("foo bar-baz".to_string()),
            &Metadata::new(),
        );
        assert_eq!(texts(&tokens), vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn test_lowercases_and_trims() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize(
            &FieldValue::Text("  Hello WORLD  ".to_string()),
            &Metadata::new(),
        );
        assert_eq!(texts(&tokens), vec!["hello", "world"]);
    }

    #[test]
    fn test_stamps_position_and_index() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize(
            &FieldValue::Text("green eggs".to_string()),
            &Metadata::new(),
        );

        assert_eq!(tokens[0].metadata["position"], serde_json::json!([0, 5]));
        assert_eq!(tokens[0].metadata["index"], serde_json::json!(0));
        assert_eq!(tokens[1].metadata["position"], serde_json::json!([6, 4]));
        assert_eq!(tokens[1].metadata["index"], serde_json::json!(1));
    }

    #[test]
    fn test_empty_runs_are_dropped() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize(
            &FieldValue::Text(" - -  foo  - ".to_string()),
            &Metadata::new(),
        );
        assert_eq!(texts(&tokens), vec!["foo"]);
    }

    #[test]
    fn test_null_yields_nothing() {
        let tokenizer = Tokenizer::default();
        assert!(
            tokenizer
                .tokenize(&FieldValue::Null, &Metadata::new())
                .is_empty()
        );
    }

    #[test]
    fn test_list_elements_become_whole_tokens() {
        let tokenizer = Tokenizer::default();
        let value = FieldValue::List(vec![
            FieldValue::Text("New York".to_string()),
            FieldValue::Number(42.0),
        ]);
        let tokens = tokenizer.tokenize(&value, &Metadata::new());
        assert_eq!(texts(&tokens), vec!["new york", "42"]);
    }

    #[test]
    fn test_prebuilt_token_passes_through_whole() {
        let tokenizer = Tokenizer::default();
        let mut extra = Metadata::new();
        extra.insert("fields".to_string(), serde_json::json!(["title"]));

        let token = Token::new("New York", Metadata::new());
        let tokens = tokenizer.tokenize(&FieldValue::Token(token), &extra);

        assert_eq!(texts(&tokens), vec!["new york"]);
        assert_eq!(tokens[0].metadata["fields"], serde_json::json!(["title"]));
    }

    #[test]
    fn test_number_value_is_stringified() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize(&FieldValue::Number(5.0), &Metadata::new());
        assert_eq!(texts(&tokens), vec!["5"]);
    }
}
