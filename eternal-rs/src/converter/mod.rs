//! OBJ to LWO conversion
//!
//! [`ModelConverter`] runs one request at a time against a game install:
//! loading an archive for browsing, summarizing OBJ and LWO inputs, and
//! converting an OBJ into an import that replaces an archive model.
//!
//! Each operation comes in two forms. The `try_*` methods return a
//! [`Result`]. The plain methods return `bool` or a possibly empty list and
//! keep the last failure in the converter, to be read back with
//! [`ModelConverter::last_error_message`] and
//! [`ModelConverter::last_error_detail`]. Nothing is retried.
//!
//! # Conversion
//!
//! 1. The OBJ is sanitized into `<obj>.obj.tmp`, reindexed in place by the
//!    [`Reindexer`] and read back.
//! 2. The geometry is unpacked, checked against the 65535 vertex limit and
//!    packed.
//! 3. The target entry's hash gives the stream index, which names the
//!    [`ImportLayout`].
//! 4. The packed streams are compressed and framed as a STREAMDB payload.
//! 5. The entry's original header is decoded, rewritten to describe the new
//!    geometry and written next to the payload.

pub mod error;
pub mod layout;

pub use error::{ConvertError, Result};
pub use layout::{GameDirs, ImportLayout, archive_stem};

use eternal_lwo::{DecodeStatus, HeaderRewrite, UnpackedGeometry, decode, decode_lenient, encode};
use eternal_obj::{DEFAULT_PRECISION, ObjDocument, Reindexer, TobjReindexer, attributes};
use eternal_resources::{
    Codec, DEFAULT_LOD_ADJUSTMENT, Oodle, ResourceArchive, ResourceEntry, StreamDbPayload,
    is_resources_path, streamdb_index,
};
use std::fmt;
use std::path::{Path, PathBuf};

/// Meshes a header may declare before its summary is treated as garbage
pub const MAX_SUMMARY_MESHES: usize = 256;

/// Tunables for a [`ModelConverter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterOptions {
    /// Directory receiving the import layouts
    pub imports_root: PathBuf,
    /// Keep the sanitized and reindexed OBJ files
    pub keep_temporaries: bool,
    /// Decimal places written by the reindexing step
    pub reindex_precision: usize,
    /// LOD adjustment used for the stream index
    pub lod_adjustment: i32,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            imports_root: PathBuf::from("imports"),
            keep_temporaries: false,
            reindex_precision: DEFAULT_PRECISION,
            lod_adjustment: DEFAULT_LOD_ADJUSTMENT,
        }
    }
}

/// One conversion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    /// Game install root; the codec is looked up under its `base` directory
    pub game_dir: PathBuf,
    /// Model to convert
    pub obj_path: PathBuf,
    /// Archive entry the model replaces, e.g. `models/props/crate.lwo`
    pub target_name: String,
    /// Archive holding the entry
    pub archive_path: PathBuf,
    /// Material declaration for the mesh
    pub material: String,
    /// Remap a Y-up model
    pub y_up: bool,
}

/// What a successful conversion produced
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    /// Stream index the payload is filed under
    pub stream_index: u64,
    /// Rewritten header
    pub header_path: PathBuf,
    /// STREAMDB payload
    pub payload_path: PathBuf,
    /// Vertices after reindexing
    pub vertex_count: usize,
    /// Triangles
    pub face_count: usize,
    /// Packed geometry size
    pub decompressed_size: usize,
    /// Compressed geometry size
    pub compressed_size: usize,
}

/// Last failure seen by the plain-method facade
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct LastError {
    message: String,
    detail: String,
}

/// Temporary files removed when dropped
struct Temporaries {
    paths: Vec<PathBuf>,
    keep: bool,
}

impl Temporaries {
    fn new(keep: bool) -> Self {
        Self {
            paths: Vec::new(),
            keep,
        }
    }

    fn track(&mut self, path: PathBuf) -> PathBuf {
        self.paths.push(path.clone());
        path
    }
}

impl Drop for Temporaries {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        for path in &self.paths {
            if path.exists()
                && let Err(e) = std::fs::remove_file(path)
            {
                log::warn!("Failed to remove {}: {e}", path.display());
            }
        }
    }
}

/// `path` with its extension replaced, e.g. `crate.obj` to `crate.obj.tmp`
fn temporary_path(path: &Path, extension: &str) -> PathBuf {
    path.with_extension(extension)
}

/// Converter state for one session
pub struct ModelConverter {
    options: ConverterOptions,
    codec: Option<Box<dyn Codec>>,
    reindexer: Box<dyn Reindexer>,
    archive: Option<ResourceArchive>,
    last_error: LastError,
    fatal: bool,
    load_error: bool,
    vertex_count: usize,
}

impl fmt::Debug for ModelConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConverter")
            .field("options", &self.options)
            .field("codec", &self.codec.as_ref().map(|c| c.name().to_string()))
            .field("archive", &self.archive.as_ref().map(ResourceArchive::path))
            .field("last_error", &self.last_error)
            .field("fatal", &self.fatal)
            .field("load_error", &self.load_error)
            .field("vertex_count", &self.vertex_count)
            .finish_non_exhaustive()
    }
}

impl Default for ModelConverter {
    fn default() -> Self {
        Self::new(ConverterOptions::default())
    }
}

impl ModelConverter {
    /// Create a converter that locates Oodle on first use
    pub fn new(options: ConverterOptions) -> Self {
        Self {
            options,
            codec: None,
            reindexer: Box::new(TobjReindexer),
            archive: None,
            last_error: LastError::default(),
            fatal: false,
            load_error: false,
            vertex_count: 0,
        }
    }

    /// Use `codec` instead of locating Oodle
    pub fn with_codec(mut self, codec: Box<dyn Codec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Use `reindexer` for the reindexing step
    pub fn with_reindexer(mut self, reindexer: Box<dyn Reindexer>) -> Self {
        self.reindexer = reindexer;
        self
    }

    /// Options in use
    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    /// Entries of the loaded archive, empty before a successful load
    pub fn resources(&self) -> &[ResourceEntry] {
        self.archive
            .as_ref()
            .map(ResourceArchive::entries)
            .unwrap_or_default()
    }

    /// The loaded archive
    pub fn archive(&self) -> Option<&ResourceArchive> {
        self.archive.as_ref()
    }

    /// Whether the last [`ModelConverter::load_archive`] failed
    pub fn has_load_error(&self) -> bool {
        self.load_error
    }

    /// Whether a fatal error has been recorded this session
    pub fn has_fatal_error(&self) -> bool {
        self.fatal
    }

    /// Headline of the last recorded failure
    pub fn last_error_message(&self) -> &str {
        &self.last_error.message
    }

    /// Detail of the last recorded failure
    pub fn last_error_detail(&self) -> &str {
        &self.last_error.detail
    }

    /// Vertex count of the last conversion that exceeded the limit
    ///
    /// Zero unless the last conversion failed the capacity check.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    fn record<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.last_error = LastError {
                    message: err.message(),
                    detail: err.detail(),
                };
                if err.is_fatal() {
                    self.fatal = true;
                }
                log::error!("{} {}", self.last_error.message, self.last_error.detail);
                None
            }
        }
    }

    /// Initialize the codec for a game install unless one is present
    fn ensure_codec(&mut self, base_dir: &Path) -> Result<()> {
        if self.codec.is_none() {
            let oodle = Oodle::locate(base_dir).map_err(|e| {
                ConvertError::config(
                    "Failed to load the oodle library.",
                    format!(
                        "Make sure the Oodle runtime is present in your game directory ({e})."
                    ),
                )
            })?;
            self.codec = Some(Box::new(oodle));
        }
        Ok(())
    }

    fn codec(&self) -> Result<&dyn Codec> {
        self.codec.as_deref().ok_or_else(|| {
            ConvertError::config("Failed to load the oodle library.", "No codec initialized.")
        })
    }

    /// Load an archive for browsing
    ///
    /// On failure the previously loaded archive stays in place.
    pub fn try_load_archive<P: AsRef<Path>>(&mut self, path: P) -> Result<&[ResourceEntry]> {
        let path = path.as_ref();
        self.load_error = true;

        let dirs = GameDirs::from_archive(path).ok_or_else(|| {
            ConvertError::config(
                "Failed to load .resource file.",
                "The .resource file must be located in your Doom Eternal \"base\" directory or its subdirectories.",
            )
        })?;
        self.ensure_codec(&dirs.base_dir)?;

        if !is_resources_path(path) {
            return Err(ConvertError::format(
                "Not a valid .resources file.",
                "Please load a file with the .resources or .resources.backup file extension.",
            ));
        }

        let archive = ResourceArchive::open(path)
            .map_err(|e| ConvertError::from_resources("Failed to read .resources file.", e))?;

        self.load_error = false;
        Ok(self.archive.insert(archive).entries())
    }

    /// Load an archive, recording any failure
    pub fn load_archive<P: AsRef<Path>>(&mut self, path: P) -> bool {
        let result = self.try_load_archive(path).map(|_| ());
        self.record(result).is_some()
    }

    /// Object names of an OBJ file
    ///
    /// More than one name means the file holds several meshes, which the
    /// caller rejects. A single-mesh file whose coordinates use positive
    /// exponents fails, since the packer cannot read them.
    pub fn try_inspect_obj<P: AsRef<Path>>(&self, path: P) -> Result<Vec<String>> {
        let path = path.as_ref();
        let doc = ObjDocument::from_path(path)
            .map_err(|e| ConvertError::from_obj("Failed to read OBJ file.", e))?;

        let names = doc.group_names();
        if names.len() > 1 {
            return Ok(names);
        }

        let unreadable = doc
            .groups()
            .first()
            .and_then(|g| g.vertices.iter().find(|l| attributes::has_positive_exponent(l)));
        if let Some(line) = unreadable {
            return Err(ConvertError::format(
                "Unsupported OBJ file.",
                format!("Vertex data uses scientific notation: {line:?}"),
            ));
        }
        Ok(names)
    }

    /// Object names of an OBJ file, empty when unreadable
    pub fn inspect_obj<P: AsRef<Path>>(&mut self, path: P) -> Vec<String> {
        let result = self.try_inspect_obj(path);
        self.record(result).unwrap_or_default()
    }

    /// Material names of an archive model
    ///
    /// Headers that stop after their meshes are accepted. Headers that fail
    /// to decode, or declare an implausible number of meshes, are rejected.
    pub fn try_inspect_lwo<P: AsRef<Path>>(
        &mut self,
        name: &str,
        archive_path: P,
    ) -> Result<Vec<String>> {
        let archive_path = archive_path.as_ref();
        if let Some(dirs) = GameDirs::from_archive(archive_path) {
            self.ensure_codec(&dirs.base_dir)?;
        }

        let archive = ResourceArchive::open(archive_path)
            .map_err(|e| ConvertError::from_resources("Failed to read .resources file.", e))?;
        let bytes = archive
            .read_entry_by_name(name, self.codec.as_deref())
            .map_err(|e| ConvertError::from_resources("Failed to extract LWO header.", e))?;

        let decoded = decode(&bytes);
        match &decoded.status {
            DecodeStatus::Rejected(reason) => {
                return Err(ConvertError::format("Unsupported LWO file.", reason));
            }
            DecodeStatus::Partial(section) => {
                log::debug!("{name}: header ends before {section}");
            }
            DecodeStatus::Complete => {}
        }

        let names = decoded.model.material_names();
        if names.len() > MAX_SUMMARY_MESHES {
            return Err(ConvertError::format(
                "Unsupported LWO file.",
                format!("Header declares {} meshes", names.len()),
            ));
        }
        Ok(names)
    }

    /// Material names of an archive model, empty when unreadable
    pub fn inspect_lwo<P: AsRef<Path>>(&mut self, name: &str, archive_path: P) -> Vec<String> {
        let result = self.try_inspect_lwo(name, archive_path);
        self.record(result).unwrap_or_default()
    }

    /// Convert an OBJ into an import replacing `request.target_name`
    pub fn try_convert(&mut self, request: &ConversionRequest) -> Result<ConversionReport> {
        self.vertex_count = 0;
        let dirs = GameDirs::from_game_dir(&request.game_dir);
        self.ensure_codec(&dirs.base_dir)?;

        let result = self.run_conversion(request);
        if let Err(ConvertError::Capacity { vertex_count }) = &result {
            self.vertex_count = *vertex_count;
        }
        result
    }

    /// Convert an OBJ, recording any failure
    ///
    /// After a capacity failure [`ModelConverter::vertex_count`] holds the
    /// offending count.
    pub fn convert(
        &mut self,
        game_dir: impl Into<PathBuf>,
        obj_path: impl Into<PathBuf>,
        target_name: &str,
        archive_path: impl Into<PathBuf>,
        material: &str,
        y_up: bool,
    ) -> bool {
        let request = ConversionRequest {
            game_dir: game_dir.into(),
            obj_path: obj_path.into(),
            target_name: target_name.to_string(),
            archive_path: archive_path.into(),
            material: material.to_string(),
            y_up,
        };
        let result = self.try_convert(&request);
        self.record(result).is_some()
    }

    fn run_conversion(&self, request: &ConversionRequest) -> Result<ConversionReport> {
        let codec = self.codec()?;
        let mut temporaries = Temporaries::new(self.options.keep_temporaries);

        // sanitize, reindex, reparse
        let source = ObjDocument::from_path(&request.obj_path)
            .map_err(|e| ConvertError::from_obj("Failed to read OBJ file.", e))?;
        let obj_tmp = temporaries.track(temporary_path(&request.obj_path, "obj.tmp"));
        let mtl_tmp = temporaries.track(temporary_path(&request.obj_path, "mtl.tmp"));
        source
            .save_sanitized(&obj_tmp)
            .map_err(|e| ConvertError::from_obj_write("Failed to write temporary OBJ file.", e))?;
        self.reindexer
            .reindex(&obj_tmp, &obj_tmp, &mtl_tmp, self.options.reindex_precision)
            .map_err(|e| ConvertError::from_obj_write("Failed to reindex OBJ file.", e))?;
        let reindexed = ObjDocument::from_path(&obj_tmp)
            .map_err(|e| ConvertError::from_obj("Failed to read reindexed OBJ file.", e))?;

        let geometry = UnpackedGeometry::from_obj(&reindexed, request.y_up)
            .map_err(|e| ConvertError::from_lwo("Failed to read OBJ geometry.", e))?;
        geometry
            .check_capacity()
            .map_err(|e| ConvertError::from_lwo("Too many vertices.", e))?;
        let (packed, bounds) = geometry
            .pack()
            .map_err(|e| ConvertError::from_lwo("Failed to pack OBJ geometry.", e))?;

        let archive = ResourceArchive::open(&request.archive_path)
            .map_err(|e| ConvertError::from_resources("Failed to read .resources file.", e))?;
        let entry = archive.find(&request.target_name).ok_or_else(|| {
            ConvertError::format(
                "Target model not found.",
                format!(
                    "{} is not in {}",
                    request.target_name,
                    request.archive_path.display()
                ),
            )
        })?;
        let stream_index = streamdb_index(entry.hash, self.options.lod_adjustment);
        log::info!(
            "{} has hash {:#018x}, stream index {stream_index}",
            entry.name,
            entry.hash
        );

        let layout = ImportLayout::new(
            &self.options.imports_root,
            &request.archive_path,
            &request.target_name,
            stream_index,
        );

        let raw = packed
            .to_bytes()
            .map_err(|e| ConvertError::from_lwo("Failed to pack OBJ geometry.", e))?;
        let payload = StreamDbPayload::compress(codec, &raw)
            .map_err(|e| ConvertError::from_resources("Failed to compress geometry.", e))?;
        let payload_bytes = payload
            .to_bytes()
            .map_err(|e| ConvertError::from_resources("Failed to compress geometry.", e))?;
        let payload_path = layout.payload_path();
        layout::write_file(&payload_path, &payload_bytes)?;

        let original = archive
            .read_entry(entry, Some(codec))
            .map_err(|e| ConvertError::from_resources("Failed to extract LWO header.", e))?;
        let header = decode_lenient(&original)
            .map_err(|e| ConvertError::from_lwo("Unsupported LWO file.", e))?;
        let rewritten = HeaderRewrite::new(request.material.as_str(), &packed, bounds)
            .compressed_size(payload.compressed_len())
            .apply(&header)
            .map_err(|e| ConvertError::from_lwo("Failed to rewrite LWO header.", e))?;
        let header_bytes = encode(&rewritten)
            .map_err(|e| ConvertError::from_lwo("Failed to rewrite LWO header.", e))?;
        let header_path = layout.header_path();
        layout::write_file(&header_path, &header_bytes)?;

        log::info!(
            "Converted {} into {} ({} vertices, {} faces)",
            request.obj_path.display(),
            layout.root().display(),
            packed.vertex_count(),
            packed.face_count()
        );

        Ok(ConversionReport {
            stream_index,
            header_path,
            payload_path,
            vertex_count: packed.vertex_count(),
            face_count: packed.face_count(),
            decompressed_size: raw.len(),
            compressed_size: payload.compressed_len(),
        })
    }
}
