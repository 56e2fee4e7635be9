use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::analysis::filters;
use crate::analysis::filters::{StemmerFilter, StopWordFilter, Trimmer};
use crate::analysis::pipeline::Pipeline;
use crate::analysis::tokenizer::Tokenizer;
use crate::automaton::number_map::NumberMap;
use crate::automaton::token_set::TokenSet;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Document, FieldRef, FieldValue, Metadata};
use crate::index::posting::{InvertedIndex, Posting};
use crate::index::vector::Vector;
use crate::search::index::Index;

/// Declared type of a field; numeric fields feed the number map and
/// accept comparator/range clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FieldType {
    #[default]
    #[serde(rename = "string")]
    Text,
    #[serde(rename = "number")]
    Number,
}

/// Maps a document to the value indexed for a field, when the stored
/// field itself is not what should be indexed.
pub type Extractor = Arc<dyn Fn(&Document) -> FieldValue + Send + Sync>;

#[derive(Clone, Default)]
pub struct FieldAttributes {
    pub boost: Option<f64>,
    pub extractor: Option<Extractor>,
    pub field_type: FieldType,
}

impl std::fmt::Debug for FieldAttributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldAttributes")
            .field("boost", &self.boost)
            .field("extractor", &self.extractor.as_ref().map(|_| "<fn>"))
            .field("field_type", &self.field_type)
            .finish()
    }
}

impl FieldAttributes {
    pub fn boost(&self) -> f64 {
        self.boost.unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentAttributes {
    pub boost: Option<f64>,
}

impl DocumentAttributes {
    pub fn boost(&self) -> f64 {
        self.boost.unwrap_or(1.0)
    }
}

/// Accumulates documents and materializes an immutable `Index`.
///
/// Ingestion runs each field value through the tokenizer and the
/// ingestion pipeline, accumulating per-(doc, field) term frequencies
/// and field lengths. `build` computes the BM25 field vectors, the
/// vocabulary token set and the number map, and hands everything to
/// the index.
#[derive(Debug)]
pub struct Builder {
    ref_field: String,
    fields: IndexMap<String, FieldAttributes>,
    documents: IndexMap<String, DocumentAttributes>,
    inverted_index: InvertedIndex,
    field_term_frequencies: IndexMap<FieldRef, HashMap<String, usize>>,
    field_lengths: IndexMap<FieldRef, usize>,
    tokenizer: Tokenizer,
    pipeline: Pipeline,
    search_pipeline: Pipeline,
    metadata_whitelist: Vec<String>,
    term_index: u32,
    b: f64,
    k1: f64,
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        filters::register_defaults();

        let mut pipeline = Pipeline::new();
        pipeline.add(Arc::new(Trimmer));
        pipeline.add(Arc::new(StopWordFilter::english()));
        pipeline.add(Arc::new(StemmerFilter::english()));

        let mut search_pipeline = Pipeline::new();
        search_pipeline.add(Arc::new(StemmerFilter::english()));

        Builder {
            ref_field: "id".to_string(),
            fields: IndexMap::new(),
            documents: IndexMap::new(),
            inverted_index: InvertedIndex::new(),
            field_term_frequencies: IndexMap::new(),
            field_lengths: IndexMap::new(),
            tokenizer: Tokenizer::default(),
            pipeline,
            search_pipeline,
            metadata_whitelist: Vec::new(),
            term_index: 0,
            b: 0.75,
            k1: 1.2,
        }
    }

    /// Name of the document field holding the reference returned in
    /// results. Defaults to `id`.
    pub fn reference(&mut self, name: impl Into<String>) -> &mut Self {
        self.ref_field = name.into();
        self
    }

    /// Declare an indexed field. `/` is reserved for field refs and
    /// rejected.
    pub fn field(&mut self, name: impl Into<String>, attributes: FieldAttributes) -> Result<&mut Self> {
        let name = name.into();
        if name.contains('/') {
            return Err(Error::new(
                ErrorKind::IllegalFieldName,
                format!("field '{}' contains illegal character '/'", name),
            ));
        }

        self.fields.insert(name, attributes);
        Ok(self)
    }

    /// Field-length normalization strength, clamped to [0, 1].
    pub fn b(&mut self, value: f64) -> &mut Self {
        self.b = value.clamp(0.0, 1.0);
        self
    }

    /// Term-frequency saturation parameter.
    pub fn k1(&mut self, value: f64) -> &mut Self {
        self.k1 = value;
        self
    }

    pub fn tokenizer(&mut self, tokenizer: Tokenizer) -> &mut Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Metadata keys copied from tokens into the inverted index.
    pub fn metadata_whitelist(&mut self, keys: Vec<String>) -> &mut Self {
        self.metadata_whitelist = keys;
        self
    }

    pub fn pipeline(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    pub fn search_pipeline(&mut self) -> &mut Pipeline {
        &mut self.search_pipeline
    }

    /// Apply a plugin: a function that configures this builder.
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: FnOnce(&mut Builder),
    {
        plugin(self);
        self
    }

    /// Ingest one document. Not transactional: on failure the builder
    /// is inconsistent and must be discarded.
    pub fn add(&mut self, doc: &Document, attributes: DocumentAttributes) -> Result<()> {
        let doc_ref = doc
            .get_field(&self.ref_field)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::NotFound,
                    format!("document is missing the reference field '{}'", self.ref_field),
                )
            })?
            .to_text();

        let field_names: Vec<String> = self.fields.keys().cloned().collect();

        for field_name in &field_names {
            let attrs = &self.fields[field_name];
            let value = match &attrs.extractor {
                Some(extractor) => extractor(doc),
                None => doc.get_field(field_name).cloned().unwrap_or(FieldValue::Null),
            };

            let mut metadata = Metadata::new();
            metadata.insert("fields".to_string(), json!([field_name]));
            metadata.insert(
                "type".to_string(),
                serde_json::to_value(attrs.field_type)?,
            );

            let tokens = self.tokenizer.tokenize(&value, &metadata);
            let terms = self.pipeline.run(tokens);

            let field_ref = FieldRef::new(doc_ref.clone(), field_name.clone());
            *self.field_lengths.entry(field_ref.clone()).or_insert(0) += terms.len();
            let frequencies = self
                .field_term_frequencies
                .entry(field_ref)
                .or_default();

            for term in &terms {
                *frequencies.entry(term.text.clone()).or_insert(0) += 1;

                if !self.inverted_index.contains(&term.text) {
                    let posting = Posting::new(self.term_index, &field_names);
                    self.term_index += 1;
                    self.inverted_index.insert(term.text.clone(), posting);
                }

                let posting = self
                    .inverted_index
                    .get_mut(&term.text)
                    .ok_or_else(|| Error::new(ErrorKind::NotFound, "posting vanished"))?;
                let occurrences = posting.fields[field_name]
                    .entry(doc_ref.clone())
                    .or_default();

                for key in &self.metadata_whitelist {
                    if let Some(value) = term.metadata.get(key) {
                        occurrences
                            .entry(key.clone())
                            .or_default()
                            .push(value.clone());
                    }
                }
            }
        }

        self.documents.insert(doc_ref, attributes);
        Ok(())
    }

    /// Average field length per field name over every added document.
    fn average_field_lengths(&self) -> HashMap<String, f64> {
        let mut sums: HashMap<String, f64> = HashMap::new();
        let mut counts: HashMap<String, f64> = HashMap::new();

        for (field_ref, &length) in &self.field_lengths {
            *sums.entry(field_ref.field_name.clone()).or_insert(0.0) += length as f64;
            *counts.entry(field_ref.field_name.clone()).or_insert(0.0) += 1.0;
        }

        sums.into_iter()
            .map(|(field, sum)| {
                let count = counts[&field];
                (field, sum / count)
            })
            .collect()
    }

    fn idf(&self, posting: &Posting) -> f64 {
        let document_count = self.documents.len() as f64;
        let document_frequency = posting.document_frequency() as f64;
        let x = (document_count - document_frequency + 0.5) / (document_frequency + 0.5);
        (1.0 + x.abs()).ln()
    }

    /// One BM25-weighted sparse vector per (doc, field), scores
    /// rounded to 3 decimals so serialized indexes are bit-identical.
    fn create_field_vectors(&self, average_field_lengths: &HashMap<String, f64>) -> Result<IndexMap<String, Vector>> {
        let mut field_vectors = IndexMap::with_capacity(self.field_term_frequencies.len());
        let mut idf_cache: HashMap<u32, f64> = HashMap::new();

        for (field_ref, frequencies) in &self.field_term_frequencies {
            let field_name = &field_ref.field_name;
            let field_length = self.field_lengths.get(field_ref).copied().unwrap_or(0) as f64;
            let average_length = average_field_lengths.get(field_name).copied().unwrap_or(0.0);
            let field_boost = self.fields[field_name].boost();
            let doc_boost = self
                .documents
                .get(&field_ref.doc_ref)
                .map_or(1.0, DocumentAttributes::boost);

            let mut vector = Vector::new();
            for (term, &frequency) in frequencies {
                let posting = self.inverted_index.get(term).ok_or_else(|| {
                    Error::new(ErrorKind::NotFound, format!("no posting for term '{}'", term))
                })?;

                let idf = *idf_cache
                    .entry(posting.term_index)
                    .or_insert_with(|| self.idf(posting));

                let tf = frequency as f64;
                let score = idf * ((self.k1 + 1.0) * tf)
                    / (self.k1 * (1.0 - self.b + self.b * (field_length / average_length)) + tf);
                let boosted = score * field_boost * doc_boost;
                let rounded = (boosted * 1000.0).round() / 1000.0;

                vector.insert(posting.term_index, rounded)?;
            }

            field_vectors.insert(field_ref.to_string(), vector);
        }

        Ok(field_vectors)
    }

    /// Finalize the build, transferring ownership of everything the
    /// index needs. The resulting index is immutable.
    pub fn build(self) -> Result<Index> {
        let average_field_lengths = self.average_field_lengths();
        let field_vectors = self.create_field_vectors(&average_field_lengths)?;

        let token_set =
            TokenSet::from_words(self.inverted_index.terms().map(String::from).collect());
        let number_map = NumberMap::from_terms(self.inverted_index.terms());

        let fields: Vec<String> = self.fields.keys().cloned().collect();
        let field_types: HashMap<String, FieldType> = self
            .fields
            .iter()
            .map(|(name, attrs)| (name.clone(), attrs.field_type))
            .collect();

        Ok(Index::new(
            self.inverted_index,
            field_vectors,
            token_set,
            number_map,
            fields,
            field_types,
            self.search_pipeline,
        ))
    }
}
