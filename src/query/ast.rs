use std::collections::HashMap;
use std::ops::BitOr;

use crate::index::builder::FieldType;

/// Effect of a clause on candidate documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presence {
    /// Contributes to scoring only.
    #[default]
    Optional,
    /// Documents must match the clause in at least one of its fields.
    Required,
    /// Documents matching the clause are removed from the results.
    Prohibited,
}

/// Bitset of automatic wildcard positions for a clause term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Wildcard(u8);

impl Wildcard {
    pub const NONE: Wildcard = Wildcard(0);
    pub const LEADING: Wildcard = Wildcard(1);
    pub const TRAILING: Wildcard = Wildcard(2);

    pub fn contains(self, other: Wildcard) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Wildcard {
    type Output = Wildcard;

    fn bitor(self, rhs: Wildcard) -> Wildcard {
        Wildcard(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparatorOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl ComparatorOp {
    pub fn from_str(s: &str) -> Option<ComparatorOp> {
        match s {
            ">" => Some(ComparatorOp::Gt),
            ">=" => Some(ComparatorOp::Gte),
            "<" => Some(ComparatorOp::Lt),
            "<=" => Some(ComparatorOp::Lte),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComparatorOp::Gt => ">",
            ComparatorOp::Gte => ">=",
            ComparatorOp::Lt => "<",
            ComparatorOp::Lte => "<=",
        }
    }
}

/// Endpoint of a numeric range; `*` in the surface syntax is `Open`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Open,
    Value(f64),
}

/// The matching unit of a clause.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryTerm {
    Text(String),
    Comparator { op: ComparatorOp, comparand: f64 },
    Range { start: Bound, end: Bound },
}

impl QueryTerm {
    pub fn is_text(&self) -> bool {
        matches!(self, QueryTerm::Text(_))
    }
}

impl Default for QueryTerm {
    fn default() -> Self {
        QueryTerm::Text(String::new())
    }
}

/// One atomic matching unit: a term, its field scope, presence, boost
/// and expansion flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// Empty means "defaulted by the query": all fields, or all numeric
    /// fields for comparator/range terms.
    pub fields: Vec<String>,
    pub term: QueryTerm,
    pub boost: f64,
    pub edit_distance: u32,
    pub use_pipeline: bool,
    pub wildcard: Wildcard,
    pub presence: Presence,
}

impl Default for Clause {
    fn default() -> Self {
        Clause {
            fields: Vec::new(),
            term: QueryTerm::default(),
            boost: 1.0,
            edit_distance: 0,
            use_pipeline: true,
            wildcard: Wildcard::NONE,
            presence: Presence::Optional,
        }
    }
}

/// A programmatic query: an ordered list of clauses plus the field
/// universe they are resolved against.
#[derive(Debug, Clone)]
pub struct Query {
    pub all_fields: Vec<String>,
    pub field_types: HashMap<String, FieldType>,
    pub clauses: Vec<Clause>,
}

impl Query {
    pub fn new(all_fields: Vec<String>, field_types: HashMap<String, FieldType>) -> Self {
        Query {
            all_fields,
            field_types,
            clauses: Vec::new(),
        }
    }

    fn numeric_fields(&self) -> Vec<String> {
        self.all_fields
            .iter()
            .filter(|f| self.field_types.get(*f) == Some(&FieldType::Number))
            .cloned()
            .collect()
    }

    /// Add a clause, filling in defaults: unset fields become the full
    /// field list (numeric fields only for comparator/range terms) and
    /// wildcard flags splice `*` into the term if not already present.
    pub fn clause(&mut self, mut clause: Clause) -> &mut Self {
        if clause.fields.is_empty() {
            clause.fields = if clause.term.is_text() {
                self.all_fields.clone()
            } else {
                self.numeric_fields()
            };
        }

        if let QueryTerm::Text(term) = &mut clause.term {
            if clause.wildcard.contains(Wildcard::LEADING) && !term.starts_with('*') {
                term.insert(0, '*');
            }
            if clause.wildcard.contains(Wildcard::TRAILING) && !term.ends_with('*') {
                term.push('*');
            }
        }

        self.clauses.push(clause);
        self
    }

    /// Add a text term clause from `template`, which supplies every
    /// option except the term itself.
    pub fn term(&mut self, term: impl Into<String>, template: Clause) -> &mut Self {
        self.clause(Clause {
            term: QueryTerm::Text(term.into()),
            ..template
        })
    }

    /// One clause per term, all sharing the same options.
    pub fn terms<I, S>(&mut self, terms: I, template: Clause) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for term in terms {
            self.term(term, template.clone());
        }
        self
    }

    /// Add a numeric comparison clause (`field <op> value`).
    pub fn comparator(&mut self, op: ComparatorOp, comparand: f64, template: Clause) -> &mut Self {
        self.clause(Clause {
            term: QueryTerm::Comparator { op, comparand },
            ..template
        })
    }

    /// Add a numeric range clause, endpoints inclusive, `Bound::Open`
    /// for unbounded sides.
    pub fn range(&mut self, start: Bound, end: Bound, template: Clause) -> &mut Self {
        self.clause(Clause {
            term: QueryTerm::Range { start, end },
            ..template
        })
    }

    /// True when every clause is prohibited: such a query matches all
    /// documents except the prohibited ones, with score 0.
    pub fn is_negated(&self) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.presence == Presence::Prohibited)
    }
}
