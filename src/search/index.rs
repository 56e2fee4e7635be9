use std::collections::HashMap;

use indexmap::IndexMap;

use crate::analysis::pipeline::Pipeline;
use crate::automaton::number_map::NumberMap;
use crate::automaton::token_set::TokenSet;
use crate::core::error::Result;
use crate::index::builder::FieldType;
use crate::index::posting::InvertedIndex;
use crate::index::vector::Vector;
use crate::query::ast::Query;
use crate::query::parser::QueryParser;
use crate::search::executor;
use crate::search::results::SearchResult;

/// An immutable, fully built search index.
///
/// Owns the inverted index, the per-(doc, field) BM25 vectors, the
/// vocabulary automaton, the number map and the search pipeline. Safe
/// to share across threads; nothing mutates after `Builder::build`.
#[derive(Debug)]
pub struct Index {
    pub(crate) inverted_index: InvertedIndex,
    pub(crate) field_vectors: IndexMap<String, Vector>,
    pub(crate) token_set: TokenSet,
    pub(crate) number_map: NumberMap,
    pub(crate) fields: Vec<String>,
    pub(crate) field_types: HashMap<String, FieldType>,
    pub(crate) pipeline: Pipeline,
}

impl Index {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        inverted_index: InvertedIndex,
        field_vectors: IndexMap<String, Vector>,
        token_set: TokenSet,
        number_map: NumberMap,
        fields: Vec<String>,
        field_types: HashMap<String, FieldType>,
        pipeline: Pipeline,
    ) -> Self {
        Index {
            inverted_index,
            field_vectors,
            token_set,
            number_map,
            fields,
            field_types,
            pipeline,
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn field_types(&self) -> &HashMap<String, FieldType> {
        &self.field_types
    }

    pub fn number_map(&self) -> &NumberMap {
        &self.number_map
    }

    /// Parse and execute a query string. Parse failures carry byte
    /// offsets into `query_string`; the index itself is unaffected.
    pub fn search(&self, query_string: &str) -> Result<Vec<SearchResult>> {
        let mut query = Query::new(self.fields.clone(), self.field_types.clone());
        QueryParser::new(query_string, &mut query).parse()?;
        executor::execute(self, &query)
    }

    /// Execute a programmatically configured query. The closure
    /// receives a fresh `Query` scoped to this call.
    pub fn query<F>(&self, configure: F) -> Result<Vec<SearchResult>>
    where
        F: FnOnce(&mut Query),
    {
        let mut query = Query::new(self.fields.clone(), self.field_types.clone());
        configure(&mut query);
        executor::execute(self, &query)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::types::{Document, FieldValue};
    use crate::index::builder::{Builder, DocumentAttributes, FieldAttributes, FieldType};
    use crate::query::ast::{Bound, Clause, Presence, Wildcard};
    use crate::search::index::Index;

    fn doc(id: &str, title: &str, body: &str, word_count: f64) -> Document {
        Document::new()
            .with_field("id", FieldValue::Text(id.to_string()))
            .with_field("title", FieldValue::Text(title.to_string()))
            .with_field("body", FieldValue::Text(body.to_string()))
            .with_field("wordCount", FieldValue::Number(word_count))
    }

    fn index() -> Index {
        let mut builder = Builder::new();
        builder.reference("id");
        builder.field("title", FieldAttributes::default()).unwrap();
        builder.field("body", FieldAttributes::default()).unwrap();
        builder
            .field(
                "wordCount",
                FieldAttributes {
                    field_type: FieldType::Number,
                    ..FieldAttributes::default()
                },
            )
            .unwrap();

        let docs = vec![
            doc("a", "green eggs and ham", "I do not like them", 5.0),
            doc("b", "cat in the hat", "The cat is back", 4.0),
            doc("c", "the lorax", "I speak for the trees", 5.0),
        ];
        for d in &docs {
            builder.add(d, DocumentAttributes::default()).unwrap();
        }

        builder.build().unwrap()
    }

    fn refs(results: &[crate::search::results::SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.doc_ref.as_str()).collect()
    }

    #[test]
    fn test_single_term_search() {
        let index = index();
        let results = index.search("cat").unwrap();
        assert_eq!(refs(&results), vec!["b"]);
        assert!(results[0].score > 0.0);
    }

    #[test]
    fn test_required_and_prohibited() {
        let index = index();
        let results = index.search("+cat -hat").unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_trailing_wildcard_search() {
        let index = index();
        let results = index.search("tre*").unwrap();
        assert_eq!(refs(&results), vec!["c"]);
    }

    #[test]
    fn test_field_scoped_search() {
        let index = index();
        let results = index.search("title:cat").unwrap();
        assert_eq!(refs(&results), vec!["b"]);
    }

    #[test]
    fn test_fuzzy_search() {
        let index = index();
        let results = index.search("ham~1").unwrap();
        assert!(refs(&results).contains(&"a"));
    }

    #[test]
    fn test_numeric_range_query() {
        let index = index();
        let results = index
            .query(|q| {
                q.range(
                    Bound::Value(5.0),
                    Bound::Value(5.0),
                    Clause {
                        fields: vec!["wordCount".to_string()],
                        ..Clause::default()
                    },
                );
            })
            .unwrap();

        let mut found = refs(&results);
        found.sort();
        assert_eq!(found, vec!["a", "c"]);
    }

    #[test]
    fn test_negated_query_matches_everything_else() {
        let index = index();
        let results = index.search("-cat").unwrap();

        let mut found = refs(&results);
        found.sort();
        assert_eq!(found, vec!["a", "c"]);
        assert!(results.iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn test_empty_query_is_negated_and_matches_all() {
        let index = index();
        let results = index.search("").unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_required_term_filters() {
        let index = index();
        let results = index.search("+the").unwrap();
        // "the" was dropped at ingestion as a stop word, so the
        // required clause expands to nothing and excludes everything
        assert_eq!(results.len(), 0);
    }

    #[test]
    fn test_multi_term_scoring_sums_fields() {
        let index = index();
        let results = index.search("green ham").unwrap();
        assert_eq!(refs(&results), vec!["a"]);
    }

    #[test]
    fn test_unknown_term_has_no_results() {
        let index = index();
        assert!(index.search("zebra").unwrap().is_empty());
    }

    #[test]
    fn test_field_boost_raises_score() {
        let build = |title_boost: Option<f64>| {
            let mut builder = Builder::new();
            builder.reference("id");
            builder
                .field(
                    "title",
                    FieldAttributes {
                        boost: title_boost,
                        ..FieldAttributes::default()
                    },
                )
                .unwrap();
            builder.field("body", FieldAttributes::default()).unwrap();
            builder
                .add(
                    &Document::new()
                        .with_field("id", FieldValue::Text("a".into()))
                        .with_field("title", FieldValue::Text("wolf".into()))
                        .with_field("body", FieldValue::Text("den".into())),
                    DocumentAttributes::default(),
                )
                .unwrap();
            builder.build().unwrap()
        };

        let plain = build(None).search("wolf").unwrap()[0].score;
        let boosted = build(Some(10.0)).search("wolf").unwrap()[0].score;
        assert!(boosted > plain);
    }

    #[test]
    fn test_document_boost_ranks_higher() {
        let mut builder = Builder::new();
        builder.reference("id");
        builder.field("title", FieldAttributes::default()).unwrap();

        let plain = Document::new()
            .with_field("id", FieldValue::Text("plain".into()))
            .with_field("title", FieldValue::Text("wolf den".into()));
        let boosted = Document::new()
            .with_field("id", FieldValue::Text("boosted".into()))
            .with_field("title", FieldValue::Text("wolf den".into()));

        builder.add(&plain, DocumentAttributes::default()).unwrap();
        builder
            .add(&boosted, DocumentAttributes { boost: Some(5.0) })
            .unwrap();

        let index = builder.build().unwrap();
        let results = index.search("wolf").unwrap();
        assert_eq!(refs(&results), vec!["boosted", "plain"]);
    }

    #[test]
    fn test_required_across_fields() {
        let index = index();
        // "cat" appears in both title and body of b
        let results = index.search("+cat").unwrap();
        assert_eq!(refs(&results), vec!["b"]);
    }

    #[test]
    fn test_prohibited_clause_contributes_no_metadata() {
        let index = index();
        let results = index.search("lorax -cat").unwrap();
        assert_eq!(refs(&results), vec!["c"]);
    }

    #[test]
    fn test_programmatic_wildcard_options() {
        let index = index();
        let results = index
            .query(|q| {
                q.term(
                    "tre",
                    Clause {
                        wildcard: Wildcard::TRAILING,
                        use_pipeline: false,
                        ..Clause::default()
                    },
                );
            })
            .unwrap();
        assert_eq!(refs(&results), vec!["c"]);
    }

    #[test]
    fn test_programmatic_required_presence() {
        let index = index();
        let results = index
            .query(|q| {
                q.term(
                    "cat",
                    Clause {
                        presence: Presence::Required,
                        ..Clause::default()
                    },
                );
                q.term("lorax", Clause::default());
            })
            .unwrap();
        assert_eq!(refs(&results), vec!["b"]);
    }

    #[test]
    fn test_clause_boost_shifts_ranking() {
        let index = index();

        // boosting one term of a two-term query favors its documents
        let cat_boosted = index.search("cat^10 lorax").unwrap();
        assert_eq!(cat_boosted[0].doc_ref, "b");

        let lorax_boosted = index.search("cat lorax^10").unwrap();
        assert_eq!(lorax_boosted[0].doc_ref, "c");
    }

    #[test]
    fn test_parse_error_surfaces_offsets() {
        let index = index();
        let err = index.search("unknown:cat").unwrap_err();
        assert!(matches!(
            err.kind,
            crate::core::error::ErrorKind::QueryParse { start: 0, end: 7 }
        ));
    }
}
