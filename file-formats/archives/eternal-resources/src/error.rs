//! Error types for the resources library

use std::io;
use thiserror::Error;

/// Result type alias for archive operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for archive, codec and framing operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The path does not look like a `.resources` archive
    #[error("Not a .resources archive: {0}")]
    InvalidPath(String),

    /// The container does not start with the `IDCL` magic
    #[error("Invalid resources magic: {0:02X?}")]
    InvalidMagic([u8; 4]),

    /// Invalid or inconsistent container structure
    #[error("Invalid resources format: {0}")]
    InvalidFormat(String),

    /// A string or path index points outside its table
    #[error("String index {index} out of range (table holds {len})")]
    InvalidStringIndex {
        /// The offending index
        index: u64,
        /// Number of items in the table
        len: usize,
    },

    /// No entry with the requested name
    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    /// The compression library could not be loaded
    #[error("Codec unavailable: {0}")]
    CodecUnavailable(String),

    /// Compression failed
    #[error("Compression error: {0}")]
    Compression(String),

    /// Decompression failed
    #[error("Decompression error: {0}")]
    Decompression(String),

    /// A decompressed buffer has the wrong size
    #[error("Size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Expected size
        expected: u64,
        /// Actual size
        actual: u64,
    },
}

impl Error {
    /// Create a new InvalidFormat error
    pub fn invalid_format<S: Into<String>>(msg: S) -> Self {
        Error::InvalidFormat(msg.into())
    }

    /// Create a new Compression error
    pub fn compression<S: Into<String>>(msg: S) -> Self {
        Error::Compression(msg.into())
    }

    /// Create a new Decompression error
    pub fn decompression<S: Into<String>>(msg: S) -> Self {
        Error::Decompression(msg.into())
    }

    /// Check if this error indicates a damaged or foreign container
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::InvalidMagic(_)
                | Error::InvalidFormat(_)
                | Error::InvalidStringIndex { .. }
                | Error::SizeMismatch { .. }
                | Error::Decompression(_)
        )
    }

    /// Check if the caller can retry with different input
    ///
    /// A missing codec is not recoverable: nothing that touches compressed
    /// data can proceed without it.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::CodecUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::invalid_format("bad string table");
        assert_eq!(err.to_string(), "Invalid resources format: bad string table");

        let err = Error::SizeMismatch {
            expected: 64,
            actual: 12,
        };
        assert_eq!(err.to_string(), "Size mismatch: expected 64 bytes, got 12");
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::InvalidMagic(*b"PK\x03\x04").is_corruption());
        assert!(Error::decompression("short output").is_corruption());
        assert!(!Error::EntryNotFound("a.lwo".into()).is_corruption());

        assert!(Error::EntryNotFound("a.lwo".into()).is_recoverable());
        assert!(!Error::CodecUnavailable("missing".into()).is_recoverable());
    }
}
