use crate::DocId;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, Error)]
pub enum SearchError {
    /// A required resource (the stopword list for the builder) is missing.
    #[error("stopword file does not exist: {}", path.display())]
    Configuration { path: PathBuf },

    /// No persisted index at the requested path.
    #[error("no index available at {}; build the index first", path.display())]
    NotFound { path: PathBuf },

    /// A single document could not be read or decoded.
    #[error("failed to extract document {doc_id}: {reason}")]
    Extraction { doc_id: DocId, reason: String },

    #[error("document {0} does not exist")]
    UnknownDocument(DocId),

    #[error("query is empty; enter at least one search term")]
    EmptyQuery,

    #[error("invalid value {value:?} for {key}")]
    InvalidConfig { key: &'static str, value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("index encoding error: {0}")]
    Codec(#[from] bincode::Error),
}
