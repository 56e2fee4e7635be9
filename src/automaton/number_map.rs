use std::cmp::Ordering;

use crate::automaton::token_set::TokenSet;
use crate::query::ast::{Bound, ComparatorOp};

/// One distinct numeric value and the index terms that produced it.
/// Several surface strings may parse to the same value ("5", "5.0").
#[derive(Debug, Clone, PartialEq)]
pub struct NumberMapEntry {
    pub value: f64,
    pub tokens: Vec<String>,
}

/// Sorted mapping from numeric field values to their index terms.
///
/// Built from the inverted index after ingestion: a term is numeric
/// iff its surface string parses as a finite number, so the map needs
/// no tokenizer cooperation. Comparator and range clauses compile to a
/// token set over a contiguous run of entries.
#[derive(Debug, Clone, Default)]
pub struct NumberMap {
    entries: Vec<NumberMapEntry>,
}

impl NumberMap {
    /// Collect every term that parses as a finite number, grouped by
    /// value, ascending.
    pub fn from_terms<'a, I>(terms: I) -> NumberMap
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut numeric: Vec<(f64, String)> = terms
            .into_iter()
            .filter_map(|term| {
                term.parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .map(|value| (value, term.to_string()))
            })
            .collect();

        numeric.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
        });

        let mut entries: Vec<NumberMapEntry> = Vec::new();
        for (value, token) in numeric {
            match entries.last_mut() {
                Some(last) if last.value == value => last.tokens.push(token),
                _ => entries.push(NumberMapEntry {
                    value,
                    tokens: vec![token],
                }),
            }
        }

        NumberMap { entries }
    }

    pub fn entries(&self) -> &[NumberMapEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn search(&self, value: f64) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|entry| entry.value.partial_cmp(&value).unwrap_or(Ordering::Equal))
    }

    /// Terms satisfying `value <op> comparand`, as a token set.
    pub fn match_comparator(&self, op: ComparatorOp, comparand: f64) -> TokenSet {
        let mut start = 0;
        let mut end = self.entries.len();

        match op {
            ComparatorOp::Gt => {
                start = match self.search(comparand) {
                    Ok(i) => i + 1,
                    Err(i) => i,
                };
            }
            ComparatorOp::Gte => {
                start = match self.search(comparand) {
                    Ok(i) | Err(i) => i,
                };
            }
            ComparatorOp::Lt => {
                end = match self.search(comparand) {
                    Ok(i) | Err(i) => i,
                };
            }
            ComparatorOp::Lte => {
                end = match self.search(comparand) {
                    Ok(i) => i + 1,
                    Err(i) => i,
                };
            }
        }

        self.token_set_for(start, end)
    }

    /// Terms with values inside `[start, end]`; `*` endpoints are
    /// unbounded and a present upper endpoint is inclusive.
    pub fn match_range(&self, start: Bound, end: Bound) -> TokenSet {
        let start_index = match start {
            Bound::Open => 0,
            Bound::Value(v) => match self.search(v) {
                Ok(i) | Err(i) => i,
            },
        };

        let end_index = match end {
            Bound::Open => self.entries.len(),
            Bound::Value(v) => match self.search(v) {
                Ok(i) => i + 1,
                Err(i) => i,
            },
        };

        self.token_set_for(start_index, end_index)
    }

    fn token_set_for(&self, start: usize, end: usize) -> TokenSet {
        if start >= end {
            return TokenSet::new();
        }

        let words: Vec<String> = self.entries[start..end]
            .iter()
            .flat_map(|entry| entry.tokens.iter().cloned())
            .collect();

        TokenSet::from_words(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> NumberMap {
        NumberMap::from_terms(vec!["4", "5", "5.0", "7", "cat", "10", "-2"])
    }

    fn matched(set: TokenSet) -> Vec<String> {
        let mut words = set.to_array();
        words.sort();
        words
    }

    #[test]
    fn test_groups_by_value_ascending() {
        let map = map();
        let values: Vec<f64> = map.entries().iter().map(|e| e.value).collect();
        assert_eq!(values, vec![-2.0, 4.0, 5.0, 7.0, 10.0]);
        assert_eq!(map.entries()[2].tokens, vec!["5", "5.0"]);
    }

    #[test]
    fn test_non_numeric_terms_are_ignored() {
        let map = NumberMap::from_terms(vec!["cat", "NaN", "inf"]);
        assert!(map.is_empty());
    }

    #[test]
    fn test_comparator_gt() {
        assert_eq!(
            matched(map().match_comparator(ComparatorOp::Gt, 5.0)),
            vec!["10", "7"]
        );
        // probe between entries
        assert_eq!(
            matched(map().match_comparator(ComparatorOp::Gt, 6.0)),
            vec!["10", "7"]
        );
    }

    #[test]
    fn test_comparator_gte() {
        assert_eq!(
            matched(map().match_comparator(ComparatorOp::Gte, 5.0)),
            vec!["10", "5", "5.0", "7"]
        );
        assert_eq!(
            matched(map().match_comparator(ComparatorOp::Gte, 6.0)),
            vec!["10", "7"]
        );
    }

    #[test]
    fn test_comparator_lt() {
        assert_eq!(
            matched(map().match_comparator(ComparatorOp::Lt, 5.0)),
            vec!["-2", "4"]
        );
        assert_eq!(
            matched(map().match_comparator(ComparatorOp::Lt, -10.0)),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_comparator_lte() {
        assert_eq!(
            matched(map().match_comparator(ComparatorOp::Lte, 5.0)),
            vec!["-2", "4", "5", "5.0"]
        );
        assert_eq!(
            matched(map().match_comparator(ComparatorOp::Lte, 4.5)),
            vec!["-2", "4"]
        );
    }

    #[test]
    fn test_range_inclusive_endpoints() {
        assert_eq!(
            matched(map().match_range(Bound::Value(4.0), Bound::Value(7.0))),
            vec!["4", "5", "5.0", "7"]
        );
    }

    #[test]
    fn test_range_point() {
        assert_eq!(
            matched(map().match_range(Bound::Value(5.0), Bound::Value(5.0))),
            vec!["5", "5.0"]
        );
    }

    #[test]
    fn test_range_open_endpoints() {
        assert_eq!(
            matched(map().match_range(Bound::Open, Bound::Value(4.0))),
            vec!["-2", "4"]
        );
        assert_eq!(
            matched(map().match_range(Bound::Value(7.0), Bound::Open)),
            vec!["10", "7"]
        );
        assert_eq!(
            matched(map().match_range(Bound::Open, Bound::Open)),
            vec!["-2", "10", "4", "5", "5.0", "7"]
        );
    }

    #[test]
    fn test_range_inverted_is_empty() {
        assert!(
            matched(map().match_range(Bound::Value(9.0), Bound::Value(2.0))).is_empty()
        );
    }
}
