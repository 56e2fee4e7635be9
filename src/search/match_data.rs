use indexmap::IndexMap;

use crate::index::posting::OccurrenceMetadata;

/// Match metadata for one result: term to field to metadata key to the
/// values collected from every contributing match. Values for the same
/// key concatenate; insertion order is preserved at every level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchData {
    pub metadata: IndexMap<String, IndexMap<String, OccurrenceMetadata>>,
}

impl MatchData {
    pub fn new() -> Self {
        MatchData::default()
    }

    pub fn with(term: &str, field: &str, metadata: &OccurrenceMetadata) -> Self {
        let mut match_data = MatchData::new();
        match_data.add(term, field, metadata);
        match_data
    }

    /// Record metadata for a (term, field) match, concatenating values
    /// for keys already present.
    pub fn add(&mut self, term: &str, field: &str, metadata: &OccurrenceMetadata) {
        let fields = self.metadata.entry(term.to_string()).or_default();
        let keys = fields.entry(field.to_string()).or_default();

        for (key, values) in metadata {
            keys.entry(key.clone())
                .or_default()
                .extend(values.iter().cloned());
        }
    }

    /// Deep merge of another result's metadata into this one.
    pub fn combine(&mut self, other: &MatchData) {
        for (term, fields) in &other.metadata {
            for (field, keys) in fields {
                self.add(term, field, keys);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(key: &str, value: serde_json::Value) -> OccurrenceMetadata {
        let mut m = OccurrenceMetadata::new();
        m.insert(key.to_string(), vec![value]);
        m
    }

    #[test]
    fn test_add_concatenates_values() {
        let mut data = MatchData::with("cat", "title", &meta("position", json!([0, 3])));
        data.add("cat", "title", &meta("position", json!([10, 3])));

        assert_eq!(
            data.metadata["cat"]["title"]["position"],
            vec![json!([0, 3]), json!([10, 3])]
        );
    }

    #[test]
    fn test_combine_merges_disjoint_terms() {
        let mut a = MatchData::with("cat", "title", &meta("position", json!([0, 3])));
        let b = MatchData::with("hat", "body", &meta("position", json!([4, 3])));

        a.combine(&b);
        assert_eq!(a.metadata.len(), 2);
        assert_eq!(a.metadata["hat"]["body"]["position"], vec![json!([4, 3])]);
    }

    #[test]
    fn test_combine_concatenates_shared_keys() {
        let mut a = MatchData::with("cat", "title", &meta("position", json!([0, 3])));
        let b = MatchData::with("cat", "title", &meta("position", json!([9, 3])));

        a.combine(&b);
        assert_eq!(
            a.metadata["cat"]["title"]["position"],
            vec![json!([0, 3]), json!([9, 3])]
        );
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut data = MatchData::new();
        data.add("zebra", "title", &OccurrenceMetadata::new());
        data.add("aardvark", "title", &OccurrenceMetadata::new());

        let terms: Vec<_> = data.metadata.keys().collect();
        assert_eq!(terms, vec!["zebra", "aardvark"]);
    }
}
