//! # eternal_obj - Wavefront OBJ Input
//!
//! Line-level OBJ handling for the model converter. Files are classified and
//! split into object groups without interpreting numbers, so a malformed
//! coordinate surfaces only when geometry is actually built from it.
//!
//! ## Examples
//!
//! ```
//! use eternal_obj::{ObjDocument, attributes};
//!
//! let doc = ObjDocument::parse("o Crate\nv 1.0 2.0 3.0\ns 1\n");
//! assert_eq!(doc.group_names(), vec!["Crate"]);
//!
//! let position = attributes::parse_vec3(&doc.groups()[0].vertices[0]).unwrap();
//! assert_eq!(position, [1.0, 2.0, 3.0]);
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod attributes;
pub mod document;
pub mod error;
pub mod reindex;

pub use document::{DEFAULT_GROUP_NAME, LineKind, ObjDocument, ObjGroup, ObjLine, classify};
pub use error::{ObjError, Result};
pub use reindex::{DEFAULT_PRECISION, Reindexer, TobjReindexer};
