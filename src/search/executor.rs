use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use log::debug;
use serde_json::json;

use crate::automaton::token_set::TokenSet;
use crate::core::error::Result;
use crate::core::types::{FieldRef, Metadata};
use crate::index::vector::Vector;
use crate::query::ast::{Clause, Presence, Query, QueryTerm};
use crate::search::doc_set::DocSet;
use crate::search::index::Index;
use crate::search::match_data::MatchData;
use crate::search::results::SearchResult;

/// Execute a query against an index.
///
/// Each clause is expanded through the search pipeline and the
/// vocabulary automaton, then folded into per-field query vectors and
/// the required/prohibited set algebra. Scores are cosine similarities
/// between query vectors and field vectors, summed per document.
pub(crate) fn execute(index: &Index, query: &Query) -> Result<Vec<SearchResult>> {
    let mut matching_fields: IndexMap<FieldRef, MatchData> = IndexMap::new();
    let mut term_field_cache: HashSet<(String, String)> = HashSet::new();
    let mut required_matches: HashMap<String, DocSet> = HashMap::new();
    let mut prohibited_matches: HashMap<String, DocSet> = HashMap::new();

    // every field gets a query vector up front so negated-only queries
    // still score (to zero) against each field
    let mut query_vectors: HashMap<String, Vector> = index
        .fields
        .iter()
        .map(|field| (field.clone(), Vector::new()))
        .collect();

    for clause in &query.clauses {
        // the pipeline may expand or drop a text term; non-text terms
        // and pipeline-less clauses pass through unchanged
        let terms: Vec<QueryTerm> = match &clause.term {
            QueryTerm::Text(text) if clause.use_pipeline => {
                let mut metadata = Metadata::new();
                metadata.insert("fields".to_string(), json!(clause.fields));
                index
                    .pipeline
                    .run_string(text, metadata)
                    .into_iter()
                    .map(QueryTerm::Text)
                    .collect()
            }
            term => vec![term.clone()],
        };

        let mut clause_matches = DocSet::Empty;

        for term in &terms {
            let effective = Clause {
                term: term.clone(),
                ..clause.clone()
            };

            let term_set = TokenSet::from_clause(&effective, &index.number_map);
            let expanded_terms = index.token_set.intersect(&term_set).to_array();
            debug!(
                "expanded {:?} into {} vocabulary terms",
                effective.term,
                expanded_terms.len()
            );

            if expanded_terms.is_empty() && clause.presence == Presence::Required {
                // a required term matching nothing empties every field
                // it scopes to; no document can satisfy the clause
                for field in &clause.fields {
                    required_matches.insert(field.clone(), DocSet::Empty);
                }
                break;
            }

            for expanded_term in &expanded_terms {
                let Some(posting) = index.inverted_index.get(expanded_term) else {
                    continue;
                };
                let term_index = posting.term_index;

                for field in &clause.fields {
                    let Some(field_posting) = posting.fields.get(field) else {
                        continue;
                    };
                    let matching_docs = DocSet::from_refs(field_posting.keys().cloned());

                    if clause.presence == Presence::Required {
                        clause_matches = clause_matches.union(&matching_docs);
                        required_matches
                            .entry(field.clone())
                            .or_insert(DocSet::Complete);
                    }

                    if clause.presence == Presence::Prohibited {
                        let entry = prohibited_matches
                            .entry(field.clone())
                            .or_insert(DocSet::Empty);
                        *entry = entry.union(&matching_docs);
                        // prohibited terms contribute no score and no
                        // match metadata
                        continue;
                    }

                    if let Some(vector) = query_vectors.get_mut(field) {
                        vector.upsert(term_index, clause.boost, |a, b| a + b);
                    }

                    // a term can expand from several clause terms; only
                    // record its metadata once per (term, field)
                    let cache_key = (expanded_term.clone(), field.clone());
                    if term_field_cache.contains(&cache_key) {
                        continue;
                    }

                    for (doc_ref, occurrences) in field_posting {
                        let field_ref = FieldRef::new(doc_ref.clone(), field.clone());
                        match matching_fields.get_mut(&field_ref) {
                            Some(existing) => existing.add(expanded_term, field, occurrences),
                            None => {
                                matching_fields.insert(
                                    field_ref,
                                    MatchData::with(expanded_term, field, occurrences),
                                );
                            }
                        }
                    }

                    term_field_cache.insert(cache_key);
                }
            }
        }

        if clause.presence == Presence::Required {
            // required means "matched in some clause field": the union
            // accumulated above intersects into each field's set
            for field in &clause.fields {
                let current = required_matches.remove(field).unwrap_or(DocSet::Empty);
                required_matches.insert(field.clone(), current.intersect(&clause_matches));
            }
        }
    }

    let mut all_required = DocSet::Complete;
    let mut all_prohibited = DocSet::Empty;

    for field in &index.fields {
        if let Some(matches) = required_matches.get(field) {
            all_required = all_required.intersect(matches);
        }
        if let Some(matches) = prohibited_matches.get(field) {
            all_prohibited = all_prohibited.union(matches);
        }
    }

    if query.is_negated() {
        // candidates are all documents; prohibition filters below and
        // empty query vectors score everything at zero
        matching_fields.clear();
        for field_ref_string in index.field_vectors.keys() {
            let field_ref = FieldRef::from_string(field_ref_string)?;
            matching_fields.insert(field_ref, MatchData::new());
        }
    }

    let mut results: Vec<SearchResult> = Vec::new();
    let mut result_by_doc: HashMap<String, usize> = HashMap::new();

    for (field_ref, match_data) in matching_fields {
        if !all_required.contains(&field_ref.doc_ref) {
            continue;
        }
        if all_prohibited.contains(&field_ref.doc_ref) {
            continue;
        }

        let Some(field_vector) = index.field_vectors.get(&field_ref.to_string()) else {
            continue;
        };
        let Some(query_vector) = query_vectors.get(&field_ref.field_name) else {
            continue;
        };
        let score = query_vector.similarity(field_vector);

        match result_by_doc.get(field_ref.doc_ref.as_str()) {
            Some(&position) => {
                results[position].score += score;
                results[position].match_data.combine(&match_data);
            }
            None => {
                result_by_doc.insert(field_ref.doc_ref.clone(), results.len());
                results.push(SearchResult {
                    doc_ref: field_ref.doc_ref,
                    score,
                    match_data,
                });
            }
        }
    }

    // stable sort: ties keep first-encountered order
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    debug!("query produced {} results", results.len());
    Ok(results)
}
