//! Error types for document persistence.

use std::io;
use thiserror::Error;

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported document version {0}")]
    UnsupportedVersion(u32),

    #[error("unknown time zone {0:?}")]
    UnknownTimeZone(String),

    /// A stored time that does not parse, or does not exist in the document
    /// time zone.
    #[error("invalid time {0:?}")]
    InvalidTime(String),

    #[error("document has never been saved")]
    NeverSaved,
}
