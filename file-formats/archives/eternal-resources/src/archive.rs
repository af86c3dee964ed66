//! Reading `.resources` archives
//!
//! An archive is parsed in one pass: header, string pool, path string
//! indexes and the entry table. Entry data is read on demand.

use crate::compression::Codec;
use crate::entry::{ENTRY_SIZE, EntryRecord, ResourceEntry};
use crate::error::{Error, Result};
use crate::header::{HEADER_SIZE, ResourceHeader};
use crate::strings::StringTable;
use byteorder::{LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Size of one dependency record preceding the path string indexes
const DEPENDENCY_SIZE: u64 = 32;

/// Whether a path names a `.resources` or `.resources.backup` file
pub fn is_resources_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.contains(".resources"))
}

/// A parsed archive
#[derive(Debug, Clone)]
pub struct ResourceArchive {
    path: PathBuf,
    header: ResourceHeader,
    entries: Vec<ResourceEntry>,
}

impl ResourceArchive {
    /// Open and parse an archive
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !is_resources_path(path) {
            return Err(Error::InvalidPath(path.display().to_string()));
        }

        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let (header, entries) = Self::parse(&mut reader)?;

        log::info!(
            "Opened {} with {} entries",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            header,
            entries,
        })
    }

    /// Parse header and entry table from any seekable source
    pub fn parse<R: Read + Seek>(reader: &mut R) -> Result<(ResourceHeader, Vec<ResourceEntry>)> {
        let stream_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let header = ResourceHeader::read(reader)?;
        log::debug!(
            "Resources v{}: {} entries, {} path indexes",
            header.version,
            header.num_resources,
            header.num_string_indices
        );

        check_region(
            "string table",
            header.string_table_offset,
            u64::from(header.string_table_size),
            stream_len,
        )?;
        reader.seek(SeekFrom::Start(header.string_table_offset))?;
        let strings = StringTable::read(reader, header.string_table_size)?;

        let path_indexes_offset = header
            .resource_deps_offset
            .saturating_add(u64::from(header.num_dependencies) * DEPENDENCY_SIZE)
            .saturating_add(u64::from(header.num_dep_indices) * 4);
        check_region(
            "path string indexes",
            path_indexes_offset,
            u64::from(header.num_string_indices) * 8,
            stream_len,
        )?;
        reader.seek(SeekFrom::Start(path_indexes_offset))?;
        let mut path_indexes = Vec::with_capacity(header.num_string_indices as usize);
        for _ in 0..header.num_string_indices {
            path_indexes.push(reader.read_u64::<LittleEndian>()?);
        }

        check_region(
            "entry table",
            header.resource_entries_offset,
            u64::from(header.num_resources) * ENTRY_SIZE as u64,
            stream_len,
        )?;
        reader.seek(SeekFrom::Start(header.resource_entries_offset))?;
        let mut entries = Vec::with_capacity(header.num_resources as usize);
        for _ in 0..header.num_resources {
            let record = EntryRecord::read(reader)?;
            let type_tag = path_string(&strings, &path_indexes, record.strings)?;
            let name = path_string(&strings, &path_indexes, record.strings.saturating_add(1))?;
            entries.push(ResourceEntry::from_record(
                &record,
                type_tag.to_string(),
                name.to_string(),
            ));
        }

        Ok((header, entries))
    }

    /// Path the archive was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Container header
    pub fn header(&self) -> &ResourceHeader {
        &self.header
    }

    /// All entries in table order
    pub fn entries(&self) -> &[ResourceEntry] {
        &self.entries
    }

    /// Consume the archive, keeping its entries
    pub fn into_entries(self) -> Vec<ResourceEntry> {
        self.entries
    }

    /// First entry with the given name
    pub fn find(&self, name: &str) -> Option<&ResourceEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Resource hash for a name, zero if absent
    pub fn resolve_hash(&self, name: &str) -> u64 {
        resolve_hash(&self.entries, name)
    }

    /// Entries whose names contain every search term
    pub fn search(&self, query: &str) -> Vec<&ResourceEntry> {
        let terms = search_terms(query);
        self.entries
            .iter()
            .filter(|e| matches_terms(&e.name, &terms))
            .collect()
    }

    /// Read one entry's data, decompressing when needed
    pub fn read_entry(&self, entry: &ResourceEntry, codec: Option<&dyn Codec>) -> Result<Vec<u8>> {
        let mut file = BufReader::new(File::open(&self.path)?);
        extract_entry(&mut file, entry, codec)
    }

    /// Read an entry looked up by name
    pub fn read_entry_by_name(&self, name: &str, codec: Option<&dyn Codec>) -> Result<Vec<u8>> {
        let entry = self
            .find(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;
        self.read_entry(entry, codec)
    }
}

/// Read one entry's stored bytes from an open archive
///
/// When the stored length differs from the uncompressed length the bytes are
/// passed through `codec`; otherwise they are returned as stored. A
/// compressed entry without a codec fails with [`Error::CodecUnavailable`].
pub fn extract_entry<R: Read + Seek>(
    reader: &mut R,
    entry: &ResourceEntry,
    codec: Option<&dyn Codec>,
) -> Result<Vec<u8>> {
    let stored_len = usize::try_from(entry.compressed_size)
        .map_err(|_| Error::invalid_format("entry size exceeds address space"))?;

    reader.seek(SeekFrom::Start(entry.offset))?;
    let mut stored = vec![0u8; stored_len];
    reader.read_exact(&mut stored)?;

    if stored.len() as u64 == entry.uncompressed_size {
        return Ok(stored);
    }

    let codec = codec.ok_or_else(|| {
        Error::CodecUnavailable(format!("{} is compressed", entry.name))
    })?;
    let expected = usize::try_from(entry.uncompressed_size)
        .map_err(|_| Error::invalid_format("entry size exceeds address space"))?;

    log::debug!(
        "Decompressing {} ({} -> {} bytes)",
        entry.name,
        stored.len(),
        expected
    );
    codec.decompress(&stored, expected)
}

/// Hash of the first entry named `name`
///
/// Returns zero when nothing matches; callers treat zero as not found.
pub fn resolve_hash(entries: &[ResourceEntry], name: &str) -> u64 {
    entries
        .iter()
        .find(|e| e.name == name)
        .map_or(0, |e| e.hash)
}

/// Split a search query into lowercase terms
pub fn search_terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether `name` contains every term
pub fn matches_terms(name: &str, terms: &[String]) -> bool {
    terms.iter().all(|t| name.contains(t.as_str()))
}

fn path_string<'a>(strings: &'a StringTable, path_indexes: &[u64], index: u64) -> Result<&'a str> {
    let string_id = usize::try_from(index)
        .ok()
        .and_then(|i| path_indexes.get(i))
        .ok_or(Error::InvalidStringIndex {
            index,
            len: path_indexes.len(),
        })?;
    strings.get(*string_id)
}

fn check_region(what: &str, offset: u64, len: u64, stream_len: u64) -> Result<()> {
    if offset < HEADER_SIZE as u64 && len > 0 {
        return Err(Error::invalid_format(format!(
            "{what} at {offset:#x} overlaps the header"
        )));
    }
    match offset.checked_add(len) {
        Some(end) if end <= stream_len => Ok(()),
        _ => Err(Error::invalid_format(format!(
            "{what} ({len} bytes at {offset:#x}) exceeds archive size {stream_len}"
        ))),
    }
}
