use crate::codec::{RejectReason, Section};
use eternal_obj::ObjError;
use std::io;
use thiserror::Error;

/// Error types for LWO decoding, encoding and geometry packing
#[derive(Error, Debug)]
pub enum LwoError {
    /// I/O error during reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The model holds no mesh records
    #[error("model has no meshes")]
    NoMeshes,

    /// Material declaration longer than the format allows
    #[error("material declaration is {length} bytes, maximum is {max}")]
    InvalidMaterialLength {
        /// Declared length
        length: usize,
        /// Largest accepted length
        max: u32,
    },

    /// The trailing header padding word is not zero
    #[error("non-zero header padding: {0:#010x}")]
    NonZeroPadding(u32),

    /// LOD record count does not match the model layout
    #[error("{layout} layout needs {expected} LOD records, mesh has {actual}")]
    UnsupportedLodCount {
        /// Layout name
        layout: &'static str,
        /// Records the layout carries
        expected: usize,
        /// Records present in the mesh
        actual: usize,
    },

    /// The model's layout is not the one its header selects
    #[error("model uses the {layout} layout but its header selects {selected}")]
    LayoutMismatch {
        /// Layout carried by the model
        layout: &'static str,
        /// Layout selected by the header's selector hash
        selected: &'static str,
    },

    /// A stream slot's lightmap stream disagrees with its offset count
    #[error("stream slot {0} lightmap stream does not match its offset count")]
    InconsistentStreamSlot(usize),

    /// Strict decoding stopped before the end of the header
    #[error("header decoded only up to the {0} section")]
    Incomplete(Section),

    /// The blob is not a usable LWO header
    #[error("header rejected: {0}")]
    Rejected(RejectReason),

    /// Geometry has no vertices or no faces
    #[error("geometry is empty")]
    EmptyGeometry,

    /// Vertex count beyond what 16-bit face indices can address
    #[error("{0} vertices exceeds the 65535 vertex limit")]
    TooManyVertices(usize),

    /// Normal or UV count differs from the vertex count
    #[error("attribute count mismatch: {vertices} vertices, {normals} normals, {uvs} uvs")]
    AttributeMismatch {
        /// Vertex count
        vertices: usize,
        /// Normal count
        normals: usize,
        /// UV count
        uvs: usize,
    },

    /// A face points past the end of the vertex list
    #[error("face {face} references vertex {index}, only {vertices} vertices")]
    FaceIndexOutOfRange {
        /// Face number
        face: usize,
        /// Offending zero-based index
        index: u32,
        /// Vertex count
        vertices: usize,
    },

    /// OBJ attribute could not be interpreted
    #[error("OBJ error: {0}")]
    Obj(#[from] ObjError),
}

impl LwoError {
    /// Whether the bytes themselves are damaged or not an LWO header
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            LwoError::NonZeroPadding(_)
                | LwoError::Incomplete(_)
                | LwoError::Rejected(_)
                | LwoError::LayoutMismatch { .. }
        )
    }

    /// Whether another input file could succeed where this one failed
    pub fn is_recoverable(&self) -> bool {
        match self {
            LwoError::Io(_) => false,
            LwoError::Obj(e) => e.is_content_error(),
            _ => true,
        }
    }
}

/// Result type using LwoError
pub type Result<T> = std::result::Result<T, LwoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corruption_classification() {
        assert!(LwoError::NonZeroPadding(1).is_corruption());
        assert!(LwoError::Rejected(RejectReason::NoMeshes).is_corruption());
        assert!(LwoError::Incomplete(Section::Settings).is_corruption());
        assert!(!LwoError::TooManyVertices(70000).is_corruption());
        assert!(!LwoError::EmptyGeometry.is_corruption());
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(LwoError::TooManyVertices(70000).is_recoverable());
        assert!(LwoError::EmptyGeometry.is_recoverable());
        let io = LwoError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert!(!io.is_recoverable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            LwoError::TooManyVertices(65536).to_string(),
            "65536 vertices exceeds the 65535 vertex limit"
        );
        assert_eq!(
            LwoError::InvalidMaterialLength {
                length: 2000,
                max: 1024
            }
            .to_string(),
            "material declaration is 2000 bytes, maximum is 1024"
        );
    }
}
