//! # eternal_resources - idTech 7 Resource Archives
//!
//! Reader for the `.resources` containers used by DOOM Eternal, plus the two
//! pieces needed to inject streamed geometry next to them: the STREAMDB
//! payload framing and the stream index derived from a resource hash.
//!
//! ## Features
//!
//! - Parses the `IDCL` header, string pool, path tuples and entry table
//! - Extracts entries on demand, decompressing through a [`Codec`]
//! - Loads the game's Oodle runtime at runtime ([`Oodle`])
//! - Derives `.streamdb` indexes from resource hashes
//!
//! ## Examples
//!
//! ```no_run
//! use eternal_resources::{Oodle, ResourceArchive};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), eternal_resources::Error> {
//! let archive = ResourceArchive::open("base/gameresources.resources")?;
//! let oodle = Oodle::locate(Path::new("base"))?;
//!
//! for entry in archive.entries().iter().filter(|e| e.is_model()) {
//!     println!("{} ({} bytes)", entry.name, entry.uncompressed_size);
//! }
//!
//! let header = archive.read_entry_by_name("models/crate.lwo", Some(&oodle))?;
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

pub mod archive;
pub mod compression;
pub mod entry;
pub mod error;
pub mod header;
pub mod stream_index;
pub mod streamdb;
pub mod strings;

#[cfg(any(test, feature = "test-utils", doc))]
pub mod test_utils;

pub use archive::{
    ResourceArchive, extract_entry, is_resources_path, matches_terms, resolve_hash, search_terms,
};
pub use compression::{Codec, OODLE_ENV_VAR, Oodle, OodleCompressor, OodleLevel};
pub use entry::{EntryRecord, MODEL_VERSION, ResourceEntry};
pub use error::{Error, Result};
pub use header::{RESOURCES_MAGIC, ResourceHeader};
pub use stream_index::{DEFAULT_LOD_ADJUSTMENT, derive_stream_index, lod_digit, streamdb_index};
pub use streamdb::{LodSpan, STREAMDB_LOD_COUNT, STREAMDB_MAGIC, StreamDbPayload};
pub use strings::StringTable;
