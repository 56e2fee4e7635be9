use std::collections::HashMap;

use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::analysis::filters;
use crate::analysis::pipeline::Pipeline;
use crate::automaton::number_map::NumberMap;
use crate::automaton::token_set::TokenSet;
use crate::core::error::Result;
use crate::index::builder::FieldType;
use crate::index::posting::{InvertedIndex, Posting};
use crate::index::vector::Vector;
use crate::search::index::Index;

pub const FORMAT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The structural wire form of an index. Postings are sorted by term
/// so output is deterministic; the vocabulary automaton and number map
/// are rebuilt on load rather than shipped.
#[derive(Serialize, Deserialize)]
struct SerializedIndex {
    version: String,
    fields: Vec<String>,
    #[serde(rename = "fieldTypes")]
    field_types: Vec<FieldType>,
    #[serde(rename = "fieldVectors")]
    field_vectors: Vec<(String, Vector)>,
    #[serde(rename = "invertedIndex")]
    inverted_index: Vec<(String, Posting)>,
    pipeline: Vec<String>,
}

impl Index {
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let mut inverted_index: Vec<(String, Posting)> = self
            .inverted_index
            .iter()
            .map(|(term, posting)| (term.clone(), posting.clone()))
            .collect();
        inverted_index.sort_by(|a, b| a.0.cmp(&b.0));

        let serialized = SerializedIndex {
            version: FORMAT_VERSION.to_string(),
            fields: self.fields.clone(),
            field_types: self
                .fields
                .iter()
                .map(|field| self.field_types.get(field).copied().unwrap_or_default())
                .collect(),
            field_vectors: self
                .field_vectors
                .iter()
                .map(|(field_ref, vector)| (field_ref.clone(), vector.clone()))
                .collect(),
            inverted_index,
            pipeline: self.pipeline.to_json(),
        };

        Ok(serde_json::to_value(serialized)?)
    }

    /// Rehydrate an index from its serialized form. A version mismatch
    /// is advisory; an unregistered pipeline label is fatal.
    pub fn load(value: serde_json::Value) -> Result<Index> {
        filters::register_defaults();

        let serialized: SerializedIndex = serde_json::from_value(value)?;

        if serialized.version != FORMAT_VERSION {
            warn!(
                "Version mismatch when loading serialised index. Current version of textindex '{}' does not match serialised index '{}'",
                FORMAT_VERSION, serialized.version
            );
        }

        let pipeline = Pipeline::load(&serialized.pipeline)?;

        let mut inverted_index = InvertedIndex::new();
        for (term, posting) in serialized.inverted_index {
            inverted_index.insert(term, posting);
        }

        let token_set =
            TokenSet::from_words(inverted_index.terms().map(String::from).collect());
        let number_map = NumberMap::from_terms(inverted_index.terms());

        let field_vectors: IndexMap<String, Vector> =
            serialized.field_vectors.into_iter().collect();
        let field_types: HashMap<String, FieldType> = serialized
            .fields
            .iter()
            .cloned()
            .zip(serialized.field_types.iter().copied())
            .collect();

        Ok(Index::new(
            inverted_index,
            field_vectors,
            token_set,
            number_map,
            serialized.fields,
            field_types,
            pipeline,
        ))
    }
}
