use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Metadata recorded about one term's occurrences in one (doc, field):
/// metadata key to the list of values seen, in occurrence order.
pub type OccurrenceMetadata = IndexMap<String, Vec<serde_json::Value>>;

/// Per-field posting data: doc ref to occurrence metadata.
pub type PostingField = IndexMap<String, OccurrenceMetadata>;

/// Inverted index entry for one term.
///
/// `term_index` is the term's dense ordinal, its position in vector
/// space. Every posting carries an entry for every index field, even
/// when empty. Wire form: `{"_index": n, "<field>": {...}, ...}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Posting {
    pub term_index: u32,
    pub fields: IndexMap<String, PostingField>,
}

impl Posting {
    pub fn new(term_index: u32, field_names: &[String]) -> Self {
        Posting {
            term_index,
            fields: field_names
                .iter()
                .map(|name| (name.clone(), PostingField::new()))
                .collect(),
        }
    }

    /// Number of (field, doc) pairs this term appears in; the document
    /// frequency used by the ranking function.
    pub fn document_frequency(&self) -> usize {
        self.fields.values().map(|docs| docs.len()).sum()
    }
}

/// The inverted index: term to posting, iterating in first-sight
/// order so term ordinals stay contiguous.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    postings: IndexMap<String, Posting>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        InvertedIndex::default()
    }

    pub fn get(&self, term: &str) -> Option<&Posting> {
        self.postings.get(term)
    }

    pub fn get_mut(&mut self, term: &str) -> Option<&mut Posting> {
        self.postings.get_mut(term)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.postings.contains_key(term)
    }

    pub fn insert(&mut self, term: String, posting: Posting) {
        self.postings.insert(term, posting);
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Posting)> {
        self.postings.iter()
    }
}

const TERM_INDEX_KEY: &str = "_index";

impl Serialize for Posting {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(TERM_INDEX_KEY, &self.term_index)?;
        for (field, docs) in &self.fields {
            map.serialize_entry(field, docs)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Posting {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct PostingVisitor;

        impl<'de> Visitor<'de> for PostingVisitor {
            type Value = Posting;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a posting map with an _index entry")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Posting, A::Error> {
                let mut term_index = None;
                let mut fields = IndexMap::new();

                while let Some(key) = map.next_key::<String>()? {
                    if key == TERM_INDEX_KEY {
                        term_index = Some(map.next_value::<u32>()?);
                    } else {
                        fields.insert(key, map.next_value::<PostingField>()?);
                    }
                }

                let term_index = term_index
                    .ok_or_else(|| serde::de::Error::custom("posting is missing _index"))?;

                Ok(Posting { term_index, fields })
            }
        }

        deserializer.deserialize_map(PostingVisitor)
    }
}
