use crate::search::match_data::MatchData;

/// One ranked search hit.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The document's reference, as extracted at build time.
    pub doc_ref: String,
    /// Sum of per-field cosine similarities against the query vectors.
    pub score: f64,
    /// Term/field metadata aggregated across the matching fields.
    pub match_data: MatchData,
}
