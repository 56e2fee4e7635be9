use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A word was fed to the token set builder out of lexicographic order.
    OutOfOrderInsertion,
    /// A sparse vector already holds a value at the inserted index.
    DuplicateIndex,
    /// A serialized field ref did not contain the `/` joiner.
    MalformedFieldRef,
    /// Field names must not contain `/`, it is reserved for field refs.
    IllegalFieldName,
    /// A pipeline label has no function registered for it.
    UnregisteredPipelineFunction,
    /// The query string failed to parse; offsets are byte positions
    /// into the source string.
    QueryParse { start: usize, end: usize },
    NotFound,
    Parse,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        Error {
            kind,
            context: context.into(),
        }
    }

    pub fn query_parse(context: impl Into<String>, start: usize, end: usize) -> Self {
        Error {
            kind: ErrorKind::QueryParse { start, end },
            context: context.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Parse,
            context: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
