//! # eternal_lwo - DOOM Eternal LWO Model Headers
//!
//! Reads and writes the `.lwo` model headers stored in `.resources`
//! archives, and packs OBJ geometry into the fixed-point streams those
//! headers describe.
//!
//! ## Features
//!
//! - Standard (three LOD) and extended (one LOD) header layouts
//! - Lenient decoding that reports how far it got ([`DecodeStatus`])
//! - Geometry unpacking from [`eternal_obj::ObjDocument`] with optional
//!   Y-up remapping
//! - Uniform-scale 16-bit position quantization and 8-bit normals
//! - Replacement header construction for converted models
//!
//! ## Examples
//!
//! ```no_run
//! use eternal_lwo::{HeaderRewrite, UnpackedGeometry, decode_lenient};
//! use eternal_obj::ObjDocument;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let original = std::fs::read("crate_01.lwo")?;
//! let source = decode_lenient(&original)?;
//!
//! let doc = ObjDocument::from_path("crate.obj")?;
//! let geometry = UnpackedGeometry::from_obj(&doc, false)?;
//! let (packed, bounds) = geometry.pack()?;
//!
//! let header = HeaderRewrite::new("models/crates/crate_01", &packed, bounds)
//!     .apply(&source)?;
//! std::fs::write("crate_01.lwo", header.to_bytes()?)?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod codec;
pub mod error;
pub mod geometry;
pub mod header;
pub mod mesh;
pub mod model;
pub mod rewrite;
pub mod settings;
pub mod stream;

pub use codec::{
    DecodeStatus, Decoded, RejectReason, Section, decode, decode_lenient, decode_strict, encode,
};
pub use error::{LwoError, Result};
pub use geometry::{
    GeometryBounds, MAX_VERTICES, PackedGeometry, StreamOffsets, UnpackedGeometry,
};
pub use header::{LodLayout, LwoHeader, STANDARD_SELECTOR};
pub use mesh::{LodRecord, LwoMesh, MAX_MATERIAL_LENGTH};
pub use model::LwoModel;
pub use rewrite::{HeaderRewrite, recompute_cumulative_sizes};
pub use settings::{LwoSettings, LwoSettings2};
pub use stream::{STREAM_SLOT_COUNT, StreamSlot};
