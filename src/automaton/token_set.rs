use std::collections::BTreeMap;

use crate::automaton::builder::TokenSetBuilder;
use crate::automaton::number_map::NumberMap;
use crate::core::error::Result;
use crate::query::ast::{Clause, QueryTerm};

/// Label that matches any edge label on the other side of an
/// intersection. A `*` node may carry a self-loop.
pub const WILDCARD: char = '*';

pub type NodeId = u32;

pub(crate) const ROOT: NodeId = 0;

#[derive(Debug, Clone, Default)]
pub(crate) struct Node {
    pub(crate) is_final: bool,
    pub(crate) edges: BTreeMap<char, NodeId>,
}

/// A minimized DFA over the corpus vocabulary.
///
/// Nodes live in an arena and edges hold arena indices, so shared
/// suffix subtrees and `*` self-loops never create ownership cycles.
/// The value doubles as a query automaton: wildcard patterns and fuzzy
/// strings are token sets too, and query expansion is automaton
/// intersection.
#[derive(Debug, Clone)]
pub struct TokenSet {
    pub(crate) nodes: Vec<Node>,
}

impl Default for TokenSet {
    fn default() -> Self {
        TokenSet::new()
    }
}

impl TokenSet {
    pub fn new() -> Self {
        TokenSet {
            nodes: vec![Node::default()],
        }
    }

    pub(crate) fn add_node(&mut self) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node::default());
        id
    }

    fn edge_or_new(&mut self, node: NodeId, label: char) -> NodeId {
        if let Some(&existing) = self.nodes[node as usize].edges.get(&label) {
            existing
        } else {
            let next = self.add_node();
            self.nodes[node as usize].edges.insert(label, next);
            next
        }
    }

    /// Build from words in ascending lexicographic order. Out of order
    /// input is a structural error.
    pub fn from_array<I, S>(words: I) -> Result<TokenSet>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = TokenSetBuilder::new();
        for word in words {
            builder.insert(word.as_ref())?;
        }
        Ok(builder.build())
    }

    /// Build from words in any order; sorts and dedups first.
    pub(crate) fn from_words(mut words: Vec<String>) -> TokenSet {
        words.sort();
        words.dedup();

        let mut builder = TokenSetBuilder::new();
        for word in &words {
            builder.insert_unchecked(word);
        }
        builder.build()
    }

    /// Compile a clause term into a query automaton.
    pub fn from_clause(clause: &Clause, number_map: &NumberMap) -> TokenSet {
        match &clause.term {
            QueryTerm::Text(text) => {
                if clause.edit_distance > 0 {
                    TokenSet::from_fuzzy_string(text, clause.edit_distance)
                } else {
                    TokenSet::from_string(text)
                }
            }
            QueryTerm::Comparator { op, comparand } => {
                number_map.match_comparator(*op, *comparand)
            }
            QueryTerm::Range { start, end } => number_map.match_range(*start, *end),
        }
    }

    /// Linear chain for a literal pattern. A `*` adds a self-loop on
    /// the current node instead of advancing, so the wildcard also
    /// matches the empty sequence.
    pub fn from_string(text: &str) -> TokenSet {
        let mut set = TokenSet::new();
        let mut node = ROOT;

        let chars: Vec<char> = text.chars().collect();
        for (i, &c) in chars.iter().enumerate() {
            let is_last = i == chars.len() - 1;

            if c == WILDCARD {
                set.nodes[node as usize].edges.insert(c, node);
                set.nodes[node as usize].is_final = is_last;
            } else {
                let next = set.add_node();
                set.nodes[next as usize].is_final = is_last;
                set.nodes[node as usize].edges.insert(c, next);
                node = next;
            }
        }

        set
    }

    /// Approximation of the strings within `edit_distance`
    /// Damerau-Levenshtein edits of `text`, with `*` standing in for
    /// "any character". Every accepted string is within the distance;
    /// a few within-distance strings may be missed.
    pub fn from_fuzzy_string(text: &str, edit_distance: u32) -> TokenSet {
        struct Frame {
            node: NodeId,
            edits: u32,
            chars: Vec<char>,
        }

        let mut set = TokenSet::new();
        let mut stack = vec![Frame {
            node: ROOT,
            edits: edit_distance,
            chars: text.chars().collect(),
        }];

        while let Some(frame) = stack.pop() {
            // no edit: consume the next character
            if !frame.chars.is_empty() {
                let next = set.edge_or_new(frame.node, frame.chars[0]);
                if frame.chars.len() == 1 {
                    set.nodes[next as usize].is_final = true;
                }
                stack.push(Frame {
                    node: next,
                    edits: frame.edits,
                    chars: frame.chars[1..].to_vec(),
                });
            }

            if frame.edits == 0 {
                continue;
            }

            // deletion: skip the current character, consume the next
            if frame.chars.len() > 1 {
                let next = set.edge_or_new(frame.node, frame.chars[1]);
                if frame.chars.len() == 2 {
                    set.nodes[next as usize].is_final = true;
                } else {
                    stack.push(Frame {
                        node: next,
                        edits: frame.edits - 1,
                        chars: frame.chars[2..].to_vec(),
                    });
                }
            }

            // deletion of the final character
            if frame.chars.len() == 1 {
                set.nodes[frame.node as usize].is_final = true;
            }

            // substitution: any character in place of the current one
            if !frame.chars.is_empty() {
                let next = set.edge_or_new(frame.node, WILDCARD);
                if frame.chars.len() == 1 {
                    set.nodes[next as usize].is_final = true;
                }
                stack.push(Frame {
                    node: next,
                    edits: frame.edits - 1,
                    chars: frame.chars[1..].to_vec(),
                });
            }

            // insertion: any extra character here
            {
                let next = set.edge_or_new(frame.node, WILDCARD);
                if frame.chars.is_empty() {
                    set.nodes[next as usize].is_final = true;
                }
                stack.push(Frame {
                    node: next,
                    edits: frame.edits - 1,
                    chars: frame.chars.clone(),
                });
            }

            // transposition: swap the next two characters
            if frame.chars.len() > 1 {
                let next = set.edge_or_new(frame.node, frame.chars[1]);
                let mut rest = Vec::with_capacity(frame.chars.len() - 1);
                rest.push(frame.chars[0]);
                rest.extend_from_slice(&frame.chars[2..]);
                stack.push(Frame {
                    node: next,
                    edits: frame.edits - 1,
                    chars: rest,
                });
            }
        }

        set
    }

    /// Automaton product. `other` is the query side: its `*` edges
    /// match every label on this side. The result owns fresh nodes;
    /// finality is the conjunction of both sides.
    pub fn intersect(&self, other: &TokenSet) -> TokenSet {
        let mut output = TokenSet::new();
        let mut stack = vec![(ROOT, ROOT, ROOT)];

        while let Some((q_node, node, out_node)) = stack.pop() {
            for (&q_label, &q_child) in &other.nodes[q_node as usize].edges {
                for (&label, &child) in &self.nodes[node as usize].edges {
                    if label != q_label && q_label != WILDCARD {
                        continue;
                    }

                    let is_final = self.nodes[child as usize].is_final
                        && other.nodes[q_child as usize].is_final;

                    let next = match output.nodes[out_node as usize].edges.get(&label) {
                        Some(&existing) => {
                            output.nodes[existing as usize].is_final |= is_final;
                            existing
                        }
                        None => {
                            let created = output.add_node();
                            output.nodes[created as usize].is_final = is_final;
                            output.nodes[out_node as usize].edges.insert(label, created);
                            created
                        }
                    };

                    stack.push((q_child, child, next));
                }
            }
        }

        output
    }

    /// All accepted words: depth-first walk emitting the accumulated
    /// edge labels at every final node. Only meaningful on acyclic
    /// sets (vocabularies and intersection results).
    pub fn to_array(&self) -> Vec<String> {
        let mut words = Vec::new();
        let mut stack = vec![(String::new(), ROOT)];

        while let Some((prefix, node)) = stack.pop() {
            if self.nodes[node as usize].is_final {
                words.push(prefix.clone());
            }

            for (&label, &child) in &self.nodes[node as usize].edges {
                let mut word = prefix.clone();
                word.push(label);
                stack.push((word, child));
            }
        }

        words
    }
}
