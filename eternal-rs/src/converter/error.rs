//! Error types for the model converter

use eternal_lwo::LwoError;
use eternal_obj::ObjError;
use std::fmt::Display;
use std::io;
use thiserror::Error;

/// Result type for converter operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Failure of one converter request
///
/// Every variant carries a short headline and a longer detail, the pair a
/// front end shows to the user.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The archive location or the codec is unusable; ends the session
    #[error("{message} {detail}")]
    Config {
        /// Headline
        message: String,
        /// Explanation
        detail: String,
    },

    /// An input file is malformed or unsupported; another file may work
    #[error("{message} {detail}")]
    Format {
        /// Headline
        message: String,
        /// Explanation
        detail: String,
    },

    /// The reindexed model has more vertices than a mesh can address
    #[error("Model has {vertex_count} vertices, the limit is 65535")]
    Capacity {
        /// Vertex count after reindexing
        vertex_count: usize,
    },

    /// Staging files or the import could not be written
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ConvertError {
    /// Create a new Config error
    pub fn config(message: impl Into<String>, detail: impl Display) -> Self {
        ConvertError::Config {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    /// Create a new Format error
    pub fn format(message: impl Into<String>, detail: impl Display) -> Self {
        ConvertError::Format {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    /// Classify an archive error raised while doing `message`
    ///
    /// A missing codec is a configuration problem. Everything else, an
    /// unreadable or truncated file included, is a format problem.
    pub fn from_resources(message: &str, err: eternal_resources::Error) -> Self {
        match err {
            eternal_resources::Error::CodecUnavailable(detail) => Self::config(message, detail),
            other => Self::format(message, other),
        }
    }

    /// Classify an LWO error raised while doing `message`
    pub fn from_lwo(message: &str, err: LwoError) -> Self {
        match err {
            LwoError::TooManyVertices(vertex_count) => ConvertError::Capacity { vertex_count },
            other => Self::format(message, other),
        }
    }

    /// Classify an OBJ error raised while reading input
    pub fn from_obj(message: &str, err: ObjError) -> Self {
        Self::format(message, err)
    }

    /// Classify an OBJ error raised while writing a staging file
    ///
    /// Only here does an I/O failure stay [`ConvertError::Io`].
    pub fn from_obj_write(message: &str, err: ObjError) -> Self {
        match err {
            ObjError::Io(e) => ConvertError::Io(e),
            other => Self::format(message, other),
        }
    }

    /// Whether the error ends the session
    pub fn is_fatal(&self) -> bool {
        matches!(self, ConvertError::Config { .. })
    }

    /// Whether retrying with different input may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ConvertError::Format { .. } | ConvertError::Capacity { .. }
        )
    }

    /// Short headline for the error
    pub fn message(&self) -> String {
        match self {
            ConvertError::Config { message, .. } | ConvertError::Format { message, .. } => {
                message.clone()
            }
            ConvertError::Capacity { .. } => "Too many vertices.".to_string(),
            ConvertError::Io(_) => "Failed to write import files.".to_string(),
        }
    }

    /// Explanation accompanying [`ConvertError::message`]
    pub fn detail(&self) -> String {
        match self {
            ConvertError::Config { detail, .. } | ConvertError::Format { detail, .. } => {
                detail.clone()
            }
            ConvertError::Capacity { vertex_count } => format!(
                "The model needs {vertex_count} vertices once reindexed; a mesh holds at most 65535."
            ),
            ConvertError::Io(e) => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let config = ConvertError::config("Failed to load the Oodle library.", "not found");
        assert!(config.is_fatal());
        assert!(!config.is_recoverable());

        let format = ConvertError::format("Not a valid .resources file.", "bad magic");
        assert!(!format.is_fatal());
        assert!(format.is_recoverable());

        let capacity = ConvertError::Capacity {
            vertex_count: 70_000,
        };
        assert!(!capacity.is_fatal());
        assert!(capacity.is_recoverable());
        assert!(capacity.detail().contains("70000"));

        let io = ConvertError::Io(io::Error::other("disk full"));
        assert!(!io.is_fatal());
        assert!(!io.is_recoverable());
    }

    #[test]
    fn test_from_lwo_keeps_vertex_count() {
        let err = ConvertError::from_lwo("pack", LwoError::TooManyVertices(65_536));
        assert!(matches!(
            err,
            ConvertError::Capacity {
                vertex_count: 65_536
            }
        ));
    }

    #[test]
    fn test_from_resources_codec_is_config() {
        let err = ConvertError::from_resources(
            "Failed to load the Oodle library.",
            eternal_resources::Error::CodecUnavailable("missing".into()),
        );
        assert!(err.is_fatal());
        assert_eq!(err.message(), "Failed to load the Oodle library.");
        assert_eq!(err.detail(), "missing");

        let err = ConvertError::from_resources(
            "Failed to read .resources file.",
            eternal_resources::Error::InvalidMagic(*b"NOPE"),
        );
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_read_failures_are_format_errors() {
        let err = ConvertError::from_resources(
            "Failed to read .resources file.",
            eternal_resources::Error::Io(io::Error::from(io::ErrorKind::UnexpectedEof)),
        );
        assert!(matches!(err, ConvertError::Format { .. }));
        assert_eq!(err.message(), "Failed to read .resources file.");

        let err = ConvertError::from_obj(
            "Failed to read OBJ file.",
            ObjError::Io(io::Error::from(io::ErrorKind::NotFound)),
        );
        assert!(err.is_recoverable());
        assert_eq!(err.message(), "Failed to read OBJ file.");

        let err = ConvertError::from_lwo(
            "Failed to rewrite LWO header.",
            LwoError::Io(io::Error::from(io::ErrorKind::UnexpectedEof)),
        );
        assert!(matches!(err, ConvertError::Format { .. }));
    }

    #[test]
    fn test_staging_write_failure_stays_io() {
        let err = ConvertError::from_obj_write(
            "Failed to write temporary OBJ file.",
            ObjError::Io(io::Error::from(io::ErrorKind::PermissionDenied)),
        );
        assert!(matches!(err, ConvertError::Io(_)));
        assert_eq!(err.message(), "Failed to write import files.");
    }

    #[test]
    fn test_display() {
        let err = ConvertError::format("Unsupported OBJ file.", "scientific notation");
        assert_eq!(err.to_string(), "Unsupported OBJ file. scientific notation");
    }
}
