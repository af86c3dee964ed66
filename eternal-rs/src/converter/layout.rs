//! Game directory discovery and import layout
//!
//! Converted models are staged as game mod imports:
//!
//! ```text
//! imports/<stem>_id#<index>/
//! ├── <archive>/<entry path>                        rewritten header
//! └── streamdb/<entry dirs>/<stem>_id#<index>.lwo   STREAMDB payload
//! ```
//!
//! `<stem>` is the entry's file name without extension and `<index>` the
//! decimal stream index.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Name of the game's data directory
pub const BASE_DIR_NAME: &str = "base";

/// Directory holding the payloads inside an import
pub const STREAMDB_DIR_NAME: &str = "streamdb";

/// Game and base directories derived from an archive path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameDirs {
    /// Install root, the parent of `base`
    pub game_dir: PathBuf,
    /// The `base` directory
    pub base_dir: PathBuf,
}

impl GameDirs {
    /// Find the first `base` directory above `archive`
    ///
    /// Returns `None` when the archive does not live under one.
    pub fn from_archive(archive: &Path) -> Option<Self> {
        let parent = archive.parent()?;
        let mut base_dir = PathBuf::new();

        for component in parent.components() {
            base_dir.push(component.as_os_str());
            if matches!(component, Component::Normal(name) if name == BASE_DIR_NAME) {
                let game_dir = base_dir.parent().map(Path::to_path_buf).unwrap_or_default();
                return Some(Self { game_dir, base_dir });
            }
        }
        None
    }

    /// Directories for a game install root
    pub fn from_game_dir(game_dir: &Path) -> Self {
        Self {
            game_dir: game_dir.to_path_buf(),
            base_dir: game_dir.join(BASE_DIR_NAME),
        }
    }
}

/// Archive file name without the `.resources` or `.resources.backup` suffix
pub fn archive_stem(archive: &Path) -> String {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = name.strip_suffix(".backup").unwrap_or(&name);
    name.strip_suffix(".resources").unwrap_or(name).to_string()
}

/// Convert a `/`-separated entry path into a native relative path
pub fn entry_path(name: &str) -> PathBuf {
    name.split('/').filter(|part| !part.is_empty()).collect()
}

/// Output locations for one converted entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLayout {
    root: PathBuf,
    key: String,
    archive_dir: String,
    entry_name: String,
}

impl ImportLayout {
    /// Layout for `entry_name` of `archive` under `imports_root`
    pub fn new(imports_root: &Path, archive: &Path, entry_name: &str, stream_index: u64) -> Self {
        let file_name = entry_name.rsplit('/').next().unwrap_or(entry_name);
        let stem = Path::new(file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let key = format!("{stem}_id#{stream_index}");

        Self {
            root: imports_root.join(&key),
            key,
            archive_dir: archive_stem(archive),
            entry_name: entry_name.to_string(),
        }
    }

    /// `<stem>_id#<index>`
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Directory holding everything for this entry
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the rewritten header goes
    pub fn header_path(&self) -> PathBuf {
        self.root
            .join(&self.archive_dir)
            .join(entry_path(&self.entry_name))
    }

    /// Where the STREAMDB payload goes
    pub fn payload_path(&self) -> PathBuf {
        let dirs = match self.entry_name.rfind('/') {
            Some(pos) => entry_path(&self.entry_name[..pos]),
            None => PathBuf::new(),
        };
        self.root
            .join(STREAMDB_DIR_NAME)
            .join(dirs)
            .join(format!("{}.lwo", self.key))
    }
}

/// Create the parent directories of `path`
///
/// A failure is logged and swallowed; writing the file itself reports the
/// problem.
pub fn ensure_parent(path: &Path) {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        log::error!(
            "Failed to create directories for file: {}: {e}",
            parent.display()
        );
    }
}

/// Write `data` to `path`, creating parent directories first
pub fn write_file(path: &Path, data: &[u8]) -> io::Result<()> {
    ensure_parent(path);
    std::fs::write(path, data)?;
    log::debug!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}
