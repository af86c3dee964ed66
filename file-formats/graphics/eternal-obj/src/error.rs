//! Error types for OBJ handling

use std::io;
use thiserror::Error;

/// Result type for OBJ operations
pub type Result<T> = std::result::Result<T, ObjError>;

/// Errors raised while reading, interpreting or reindexing OBJ data
#[derive(Debug, Error)]
pub enum ObjError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A numeric token did not parse
    #[error("Invalid number {token:?} in line {line:?}")]
    InvalidNumber {
        /// The offending token
        token: String,
        /// The whole line
        line: String,
    },

    /// A line had fewer tokens than its kind requires
    #[error("Expected {expected} values in line {line:?}")]
    MissingTokens {
        /// Values required
        expected: usize,
        /// The whole line
        line: String,
    },

    /// A face index was zero, negative or unparseable
    #[error("Invalid face index {token:?} in line {line:?}")]
    InvalidFaceIndex {
        /// The offending token
        token: String,
        /// The whole line
        line: String,
    },

    /// The reindexing step failed
    #[error("Reindexing failed: {0}")]
    Reindex(String),
}

impl ObjError {
    /// Whether the error comes from malformed OBJ content rather than I/O
    pub fn is_content_error(&self) -> bool {
        !matches!(self, ObjError::Io(_))
    }
}
