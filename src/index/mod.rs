pub mod builder;
pub mod posting;
pub mod serialization;
pub mod vector;

pub use builder::{Builder, DocumentAttributes, FieldAttributes, FieldType};
pub use posting::{InvertedIndex, OccurrenceMetadata, Posting, PostingField};
pub use vector::Vector;
