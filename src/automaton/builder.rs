use std::collections::HashMap;

use crate::automaton::token_set::{NodeId, ROOT, TokenSet};
use crate::core::error::{Error, ErrorKind, Result};

/// Structural identity of a sealed subtree: finality plus the sorted
/// outgoing edges. Children are already canonical when the key is
/// computed, so their ids are permanent.
type NodeKey = (bool, Vec<(char, NodeId)>);

struct UncheckedNode {
    parent: NodeId,
    label: char,
    child: NodeId,
}

/// Incremental builder for a minimized token set.
///
/// Words must arrive in ascending lexicographic order. The suffix of
/// the previous word beyond its common prefix with the incoming word
/// can no longer change, so it is minimized: each sealed subtree is
/// interned by its structural key and equivalent siblings collapse
/// onto one canonical node.
pub struct TokenSetBuilder {
    previous_word: String,
    set: TokenSet,
    unchecked: Vec<UncheckedNode>,
    minimized: HashMap<NodeKey, NodeId>,
}

impl Default for TokenSetBuilder {
    fn default() -> Self {
        TokenSetBuilder::new()
    }
}

impl TokenSetBuilder {
    pub fn new() -> Self {
        TokenSetBuilder {
            previous_word: String::new(),
            set: TokenSet::new(),
            unchecked: Vec::new(),
            minimized: HashMap::new(),
        }
    }

    pub fn insert(&mut self, word: &str) -> Result<()> {
        if word < self.previous_word.as_str() {
            return Err(Error::new(
                ErrorKind::OutOfOrderInsertion,
                format!(
                    "Out of order word insertion: '{}' after '{}'",
                    word, self.previous_word
                ),
            ));
        }

        self.insert_unchecked(word);
        Ok(())
    }

    /// Insert a word the caller guarantees is in order.
    pub(crate) fn insert_unchecked(&mut self, word: &str) {
        let common = word
            .chars()
            .zip(self.previous_word.chars())
            .take_while(|(a, b)| a == b)
            .count();

        self.minimize(common);

        let mut node = self.unchecked.last().map_or(ROOT, |u| u.child);
        for label in word.chars().skip(common) {
            let child = self.set.add_node();
            self.set.nodes[node as usize].edges.insert(label, child);
            self.unchecked.push(UncheckedNode {
                parent: node,
                label,
                child,
            });
            node = child;
        }

        self.set.nodes[node as usize].is_final = true;
        self.previous_word.clear();
        self.previous_word.push_str(word);
    }

    /// Seal every node deeper than `down_to`, deepest first. A child
    /// whose key is already interned is replaced by its canonical
    /// sibling; otherwise it becomes the canonical node for that key.
    fn minimize(&mut self, down_to: usize) {
        while self.unchecked.len() > down_to {
            let Some(unchecked) = self.unchecked.pop() else {
                break;
            };

            let key = self.node_key(unchecked.child);
            match self.minimized.get(&key) {
                Some(&canonical) => {
                    self.set.nodes[unchecked.parent as usize]
                        .edges
                        .insert(unchecked.label, canonical);
                }
                None => {
                    self.minimized.insert(key, unchecked.child);
                }
            }
        }
    }

    fn node_key(&self, id: NodeId) -> NodeKey {
        let node = &self.set.nodes[id as usize];
        (
            node.is_final,
            node.edges.iter().map(|(&label, &child)| (label, child)).collect(),
        )
    }

    pub fn finish(&mut self) {
        self.minimize(0);
    }

    pub fn build(mut self) -> TokenSet {
        self.finish();
        self.set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    /// Ids of nodes reachable from the root.
    fn reachable(set: &TokenSet) -> BTreeSet<NodeId> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![ROOT];
        while let Some(node) = stack.pop() {
            if seen.insert(node) {
                stack.extend(set.nodes[node as usize].edges.values().copied());
            }
        }
        seen
    }

    fn structural_key(set: &TokenSet, id: NodeId) -> (bool, Vec<(char, NodeId)>) {
        let node = &set.nodes[id as usize];
        (
            node.is_final,
            node.edges.iter().map(|(&l, &c)| (l, c)).collect(),
        )
    }

    #[test]
    fn test_minimization_shares_suffixes() {
        // "cats" and "dogs" share the "s"-accepting leaf; "cat" and
        // "dog" share finality through it.
        let set = TokenSet::from_array(vec!["cat", "cats", "dog", "dogs"]).unwrap();

        let live = reachable(&set);
        // c-a-t, d-o-g chains plus root and one shared final "s" tail:
        // root, a few interior nodes, one shared leaf pair.
        let keys: BTreeSet<_> = live.iter().map(|&id| structural_key(&set, id)).collect();
        assert_eq!(
            keys.len(),
            live.len(),
            "no two reachable nodes may share a structural key"
        );
    }

    #[test]
    fn test_minimized_dfa_accepts_exactly_the_input() {
        let words = vec!["bake", "baker", "bakery", "take", "taker"];
        let set = TokenSet::from_array(words.clone()).unwrap();

        let mut output = set.to_array();
        output.sort();
        assert_eq!(
            output,
            words.iter().map(|w| w.to_string()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_duplicate_insert_is_idempotent() {
        let mut builder = TokenSetBuilder::new();
        builder.insert("cat").unwrap();
        builder.insert("cat").unwrap();
        assert_eq!(builder.build().to_array(), vec!["cat"]);
    }

    #[test]
    fn test_out_of_order_insert_fails() {
        let mut builder = TokenSetBuilder::new();
        builder.insert("dog").unwrap();
        assert!(builder.insert("cat").is_err());
    }

    #[test]
    fn test_empty_builder_accepts_nothing() {
        let builder = TokenSetBuilder::new();
        assert!(builder.build().to_array().is_empty());
    }
}
