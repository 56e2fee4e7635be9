use std::collections::HashSet;

/// Set of document refs with `Complete` and `Empty` sentinels.
///
/// The sentinels make the required/prohibited set algebra total:
/// `Complete` intersects to the other side and absorbs unions,
/// `Empty` is the dual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocSet {
    Complete,
    Empty,
    Finite(HashSet<String>),
}

impl DocSet {
    pub fn from_refs<I, S>(refs: I) -> DocSet
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DocSet::Finite(refs.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, doc_ref: &str) -> bool {
        match self {
            DocSet::Complete => true,
            DocSet::Empty => false,
            DocSet::Finite(refs) => refs.contains(doc_ref),
        }
    }

    pub fn intersect(&self, other: &DocSet) -> DocSet {
        match (self, other) {
            (DocSet::Complete, _) => other.clone(),
            (_, DocSet::Complete) => self.clone(),
            (DocSet::Empty, _) | (_, DocSet::Empty) => DocSet::Empty,
            (DocSet::Finite(a), DocSet::Finite(b)) => {
                // iterate the smaller side
                let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
                DocSet::Finite(
                    small
                        .iter()
                        .filter(|r| large.contains(*r))
                        .cloned()
                        .collect(),
                )
            }
        }
    }

    pub fn union(&self, other: &DocSet) -> DocSet {
        match (self, other) {
            (DocSet::Complete, _) | (_, DocSet::Complete) => DocSet::Complete,
            (DocSet::Empty, _) => other.clone(),
            (_, DocSet::Empty) => self.clone(),
            (DocSet::Finite(a), DocSet::Finite(b)) => {
                DocSet::Finite(a.union(b).cloned().collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finite(refs: &[&str]) -> DocSet {
        DocSet::from_refs(refs.iter().copied())
    }

    #[test]
    fn test_complete_contains_everything() {
        assert!(DocSet::Complete.contains("anything"));
        assert!(!DocSet::Empty.contains("anything"));
    }

    #[test]
    fn test_sentinel_intersection() {
        let s = finite(&["a", "b"]);
        assert_eq!(DocSet::Complete.intersect(&s), s);
        assert_eq!(s.intersect(&DocSet::Complete), s);
        assert_eq!(DocSet::Empty.intersect(&s), DocSet::Empty);
        assert_eq!(s.intersect(&DocSet::Empty), DocSet::Empty);
    }

    #[test]
    fn test_sentinel_union() {
        let s = finite(&["a", "b"]);
        assert_eq!(DocSet::Complete.union(&s), DocSet::Complete);
        assert_eq!(s.union(&DocSet::Complete), DocSet::Complete);
        assert_eq!(DocSet::Empty.union(&s), s);
        assert_eq!(s.union(&DocSet::Empty), s);
    }

    #[test]
    fn test_finite_intersection() {
        let a = finite(&["a", "b", "c"]);
        let b = finite(&["b", "c", "d"]);
        assert_eq!(a.intersect(&b), finite(&["b", "c"]));
    }

    #[test]
    fn test_finite_union() {
        let a = finite(&["a", "b"]);
        let b = finite(&["b", "c"]);
        assert_eq!(a.union(&b), finite(&["a", "b", "c"]));
    }
}
