pub mod analysis;
pub mod automaton;
pub mod core;
pub mod index;
pub mod query;
pub mod search;

pub use crate::analysis::pipeline::{Pipeline, PipelineFunction, register_function};
pub use crate::analysis::token::Token;
pub use crate::analysis::tokenizer::Tokenizer;
pub use crate::automaton::{NumberMap, TokenSet, TokenSetBuilder};
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::types::{Document, FieldRef, FieldValue, Metadata};
pub use crate::index::builder::{Builder, DocumentAttributes, FieldAttributes, FieldType};
pub use crate::query::ast::{Bound, Clause, ComparatorOp, Presence, Query, QueryTerm, Wildcard};
pub use crate::search::index::Index;
pub use crate::search::match_data::MatchData;
pub use crate::search::results::SearchResult;
