//! Command implementations

pub mod convert;
pub mod lwo;
pub mod obj;
pub mod resources;

use anyhow::{Context, Result};
use eternal_resources::{Codec, Oodle};
use std::path::Path;

use crate::converter::GameDirs;

/// Codec for reading an archive's compressed entries
///
/// An explicit library path must load. Without one the game install around
/// `archive` is searched, and a failed search only means compressed entries
/// cannot be read.
pub(crate) fn open_codec(oodle: Option<&Path>, archive: &Path) -> Result<Option<Box<dyn Codec>>> {
    if let Some(path) = oodle {
        let codec = Oodle::load(path)
            .with_context(|| format!("Failed to load Oodle from {}", path.display()))?;
        return Ok(Some(Box::new(codec)));
    }

    let Some(dirs) = GameDirs::from_archive(archive) else {
        log::info!("{} is not inside a game install", archive.display());
        return Ok(None);
    };

    match Oodle::locate(&dirs.base_dir) {
        Ok(codec) => Ok(Some(Box::new(codec))),
        Err(e) => {
            log::warn!("Compressed entries cannot be read: {e}");
            Ok(None)
        }
    }
}
