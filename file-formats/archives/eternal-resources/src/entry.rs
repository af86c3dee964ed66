//! Resource entry records

use crate::error::Result;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// On-disk size of one [`EntryRecord`]
pub const ENTRY_SIZE: usize = 0x90;

/// Format version carried by `.lwo` model entries
pub const MODEL_VERSION: u32 = 67;

/// Raw 0x90-byte entry as stored in the resource entry table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryRecord {
    /// String id of the type name
    pub resource_type_string: u64,
    /// String id of the entry name
    pub name_string: u64,
    /// String id of the description
    pub desc_string: u64,
    /// First dependency index
    pub dep_indices: u64,
    /// Index into the path string indexes; type at `strings`, name at `strings + 1`
    pub strings: u64,
    /// First special hash index
    pub special_hashes: u64,
    /// First meta entry index
    pub meta_entries: u64,
    /// Absolute offset of the entry data
    pub data_offset: u64,
    /// Stored size of the entry data
    pub data_size: u64,
    /// Size after decompression
    pub uncompressed_size: u64,
    /// Checksum of the stored data
    pub data_checksum: u64,
    /// Build timestamp
    pub generation_timestamp: u64,
    /// Primary resource hash
    pub default_hash: u64,
    /// Format version of the entry payload
    pub version: u32,
    /// Entry flags
    pub flags: u32,
    /// Compression mode
    pub comp_mode: u8,
    /// Reserved
    pub reserved0: u8,
    /// Variation
    pub variation: u16,
    /// Reserved
    pub reserved2: u32,
    /// Reserved
    pub reserved_for_variations: u64,
    /// Number of path strings
    pub num_strings: u16,
    /// Number of sources
    pub num_sources: u16,
    /// Number of dependencies
    pub num_dependencies: u16,
    /// Number of special hashes
    pub num_special_hashes: u16,
    /// Number of meta entries
    pub num_meta_entries: u16,
}

impl EntryRecord {
    /// Read one entry record
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let record = Self {
            resource_type_string: reader.read_u64::<LittleEndian>()?,
            name_string: reader.read_u64::<LittleEndian>()?,
            desc_string: reader.read_u64::<LittleEndian>()?,
            dep_indices: reader.read_u64::<LittleEndian>()?,
            strings: reader.read_u64::<LittleEndian>()?,
            special_hashes: reader.read_u64::<LittleEndian>()?,
            meta_entries: reader.read_u64::<LittleEndian>()?,
            data_offset: reader.read_u64::<LittleEndian>()?,
            data_size: reader.read_u64::<LittleEndian>()?,
            uncompressed_size: reader.read_u64::<LittleEndian>()?,
            data_checksum: reader.read_u64::<LittleEndian>()?,
            generation_timestamp: reader.read_u64::<LittleEndian>()?,
            default_hash: reader.read_u64::<LittleEndian>()?,
            version: reader.read_u32::<LittleEndian>()?,
            flags: reader.read_u32::<LittleEndian>()?,
            comp_mode: reader.read_u8()?,
            reserved0: reader.read_u8()?,
            variation: reader.read_u16::<LittleEndian>()?,
            reserved2: reader.read_u32::<LittleEndian>()?,
            reserved_for_variations: reader.read_u64::<LittleEndian>()?,
            num_strings: reader.read_u16::<LittleEndian>()?,
            num_sources: reader.read_u16::<LittleEndian>()?,
            num_dependencies: reader.read_u16::<LittleEndian>()?,
            num_special_hashes: reader.read_u16::<LittleEndian>()?,
            num_meta_entries: reader.read_u16::<LittleEndian>()?,
        };

        let mut padding = [0u8; 6];
        reader.read_exact(&mut padding)?;

        Ok(record)
    }

    /// Write one entry record
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u64::<LittleEndian>(self.resource_type_string)?;
        writer.write_u64::<LittleEndian>(self.name_string)?;
        writer.write_u64::<LittleEndian>(self.desc_string)?;
        writer.write_u64::<LittleEndian>(self.dep_indices)?;
        writer.write_u64::<LittleEndian>(self.strings)?;
        writer.write_u64::<LittleEndian>(self.special_hashes)?;
        writer.write_u64::<LittleEndian>(self.meta_entries)?;
        writer.write_u64::<LittleEndian>(self.data_offset)?;
        writer.write_u64::<LittleEndian>(self.data_size)?;
        writer.write_u64::<LittleEndian>(self.uncompressed_size)?;
        writer.write_u64::<LittleEndian>(self.data_checksum)?;
        writer.write_u64::<LittleEndian>(self.generation_timestamp)?;
        writer.write_u64::<LittleEndian>(self.default_hash)?;
        writer.write_u32::<LittleEndian>(self.version)?;
        writer.write_u32::<LittleEndian>(self.flags)?;
        writer.write_u8(self.comp_mode)?;
        writer.write_u8(self.reserved0)?;
        writer.write_u16::<LittleEndian>(self.variation)?;
        writer.write_u32::<LittleEndian>(self.reserved2)?;
        writer.write_u64::<LittleEndian>(self.reserved_for_variations)?;
        writer.write_u16::<LittleEndian>(self.num_strings)?;
        writer.write_u16::<LittleEndian>(self.num_sources)?;
        writer.write_u16::<LittleEndian>(self.num_dependencies)?;
        writer.write_u16::<LittleEndian>(self.num_special_hashes)?;
        writer.write_u16::<LittleEndian>(self.num_meta_entries)?;
        writer.write_all(&[0u8; 6])?;
        Ok(())
    }
}

/// A resolved archive entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    /// Entry path, e.g. `models/mapobjects/crate.lwo`
    pub name: String,
    /// Type tag, e.g. `model`
    pub type_tag: String,
    /// Absolute offset of the stored data
    pub offset: u64,
    /// Stored size
    pub compressed_size: u64,
    /// Size after decompression
    pub uncompressed_size: u64,
    /// Payload format version
    pub version: u32,
    /// Primary resource hash
    pub hash: u64,
    /// Entry flags
    pub flags: u32,
    /// Compression mode
    pub comp_mode: u8,
    /// Checksum of the stored data
    pub checksum: u64,
}

impl ResourceEntry {
    pub(crate) fn from_record(record: &EntryRecord, type_tag: String, name: String) -> Self {
        Self {
            name,
            type_tag,
            offset: record.data_offset,
            compressed_size: record.data_size,
            uncompressed_size: record.uncompressed_size,
            version: record.version,
            hash: record.default_hash,
            flags: record.flags,
            comp_mode: record.comp_mode,
            checksum: record.data_checksum,
        }
    }

    /// Whether the stored bytes need decompression
    pub fn is_compressed(&self) -> bool {
        self.compressed_size != self.uncompressed_size
    }

    /// Whether this entry is an `.lwo` model
    pub fn is_model(&self) -> bool {
        self.version == MODEL_VERSION
    }

    /// Whether this entry is a model the converter can target
    ///
    /// Baked world geometry, brush models and vertex paint sets share the
    /// model version but not the mesh layout.
    pub fn is_convertible_model(&self) -> bool {
        if !self.is_model() {
            return false;
        }

        let name = self.name.as_str();
        if name.contains("world_") && name.contains("maps/game") {
            return false;
        }

        !(name.contains(".bmodel") || name.contains(".vpaint"))
    }

    /// File name portion of the entry path
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Directory portion of the entry path, without a trailing slash
    pub fn parent_dir(&self) -> &str {
        match self.name.rfind('/') {
            Some(pos) => &self.name[..pos],
            None => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn entry(name: &str, version: u32) -> ResourceEntry {
        ResourceEntry {
            name: name.to_string(),
            type_tag: "model".to_string(),
            offset: 0,
            compressed_size: 10,
            uncompressed_size: 10,
            version,
            hash: 0,
            flags: 0,
            comp_mode: 0,
            checksum: 0,
        }
    }

    #[test]
    fn test_record_size() {
        let record = EntryRecord {
            data_offset: 0x1234,
            default_hash: 0xDEAD_BEEF,
            version: MODEL_VERSION,
            comp_mode: 2,
            ..Default::default()
        };
        let mut buf = Vec::new();
        record.write(&mut buf).unwrap();
        assert_eq!(buf.len(), ENTRY_SIZE);
        assert_eq!(u64::from_le_bytes(buf[0x38..0x40].try_into().unwrap()), 0x1234);
        assert_eq!(
            u64::from_le_bytes(buf[0x60..0x68].try_into().unwrap()),
            0xDEAD_BEEF
        );
        assert_eq!(u32::from_le_bytes(buf[0x68..0x6C].try_into().unwrap()), 67);
        assert_eq!(buf[0x70], 2);

        let parsed = EntryRecord::read(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_model_filters() {
        assert!(entry("models/crate.lwo", 67).is_convertible_model());
        assert!(!entry("models/crate.lwo", 21).is_model());
        assert!(!entry("maps/game/hub/world_00.lwo", 67).is_convertible_model());
        assert!(!entry("models/door.bmodel", 67).is_convertible_model());
        assert!(!entry("models/crate.lwo.vpaint", 67).is_convertible_model());
        // world_ outside maps/game is an ordinary model
        assert!(entry("models/world_globe.lwo", 67).is_convertible_model());
    }

    #[test]
    fn test_path_parts() {
        let e = entry("models/mapobjects/crate.lwo", 67);
        assert_eq!(e.file_name(), "crate.lwo");
        assert_eq!(e.parent_dir(), "models/mapobjects");

        let e = entry("crate.lwo", 67);
        assert_eq!(e.file_name(), "crate.lwo");
        assert_eq!(e.parent_dir(), "");
    }
}
