//! Builder for synthetic `.resources` archives

use crate::compression::Codec;
use crate::entry::{ENTRY_SIZE, EntryRecord, MODEL_VERSION};
use crate::error::Result;
use crate::header::{HEADER_SIZE, RESOURCES_VERSION, ResourceHeader};
use crate::strings::StringTable;
use std::path::Path;

#[derive(Debug, Clone)]
struct PendingEntry {
    name: String,
    type_tag: String,
    version: u32,
    hash: u64,
    stored: Vec<u8>,
    uncompressed_size: u64,
}

/// Builds an archive with one path tuple per entry and no dependencies
#[derive(Debug, Clone, Default)]
pub struct ResourceArchiveBuilder {
    entries: Vec<PendingEntry>,
}

impl ResourceArchiveBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry stored uncompressed
    pub fn add_entry(mut self, name: &str, type_tag: &str, version: u32, hash: u64, data: &[u8]) -> Self {
        self.entries.push(PendingEntry {
            name: name.to_string(),
            type_tag: type_tag.to_string(),
            version,
            hash,
            uncompressed_size: data.len() as u64,
            stored: data.to_vec(),
        });
        self
    }

    /// Add an entry compressed with `codec`
    pub fn add_compressed_entry(
        mut self,
        name: &str,
        type_tag: &str,
        version: u32,
        hash: u64,
        data: &[u8],
        codec: &dyn Codec,
    ) -> Result<Self> {
        self.entries.push(PendingEntry {
            name: name.to_string(),
            type_tag: type_tag.to_string(),
            version,
            hash,
            uncompressed_size: data.len() as u64,
            stored: codec.compress(data)?,
        });
        Ok(self)
    }

    /// Add an uncompressed `.lwo` model entry
    pub fn add_model(self, name: &str, hash: u64, data: &[u8]) -> Self {
        self.add_entry(name, "model", MODEL_VERSION, hash, data)
    }

    /// Serialize the archive
    pub fn build(&self) -> Result<Vec<u8>> {
        let count = self.entries.len();

        let strings = StringTable::new(
            self.entries
                .iter()
                .flat_map(|e| [e.type_tag.clone(), e.name.clone()])
                .collect(),
        );
        let mut string_bytes = Vec::new();
        let string_table_size = strings.write(&mut string_bytes)?;

        let entries_offset = HEADER_SIZE as u64;
        let string_table_offset = entries_offset + (count * ENTRY_SIZE) as u64;
        let deps_offset = string_table_offset + string_bytes.len() as u64;
        let data_offset = deps_offset + (count * 2 * 8) as u64;

        let header = ResourceHeader {
            version: RESOURCES_VERSION,
            num_segments: 1,
            segment_size: 0x1000,
            num_resources: count as u32,
            num_string_indices: (count * 2) as u32,
            string_table_size,
            string_table_offset,
            meta_entries_offset: deps_offset,
            resource_entries_offset: entries_offset,
            resource_deps_offset: deps_offset,
            resource_special_hash_offset: data_offset,
            data_offset,
            ..Default::default()
        };

        let mut out = Vec::new();
        header.write(&mut out)?;

        let mut cursor = data_offset;
        for (i, entry) in self.entries.iter().enumerate() {
            let record = EntryRecord {
                strings: (i * 2) as u64,
                data_offset: cursor,
                data_size: entry.stored.len() as u64,
                uncompressed_size: entry.uncompressed_size,
                default_hash: entry.hash,
                version: entry.version,
                comp_mode: u8::from(entry.stored.len() as u64 != entry.uncompressed_size),
                num_strings: 2,
                ..Default::default()
            };
            record.write(&mut out)?;
            cursor += entry.stored.len() as u64;
        }

        out.extend_from_slice(&string_bytes);
        for i in 0..(count * 2) as u64 {
            out.extend_from_slice(&i.to_le_bytes());
        }
        for entry in &self.entries {
            out.extend_from_slice(&entry.stored);
        }

        Ok(out)
    }

    /// Serialize the archive to a file
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.build()?)?;
        Ok(())
    }
}
