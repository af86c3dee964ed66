//! Container header of a `.resources` archive

use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// `IDCL` magic at the start of every archive
pub const RESOURCES_MAGIC: [u8; 4] = *b"IDCL";

/// On-disk size of [`ResourceHeader`]
pub const HEADER_SIZE: usize = 0x70;

/// Archive version shipped with DOOM Eternal
pub const RESOURCES_VERSION: u32 = 12;

/// Fixed header at offset 0 of a `.resources` file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceHeader {
    /// Container version
    pub version: u32,
    /// Container flags
    pub flags: u32,
    /// Number of data segments
    pub num_segments: u32,
    /// Size of a data segment
    pub segment_size: u64,
    /// Hash over the metadata region
    pub metadata_hash: u64,
    /// Number of resource entries
    pub num_resources: u32,
    /// Number of dependency records
    pub num_dependencies: u32,
    /// Number of dependency indices
    pub num_dep_indices: u32,
    /// Number of path string indexes
    pub num_string_indices: u32,
    /// Number of special hashes
    pub num_special_hashes: u32,
    /// Number of meta entries
    pub num_meta_entries: u32,
    /// Byte size of the string table, including its count and offsets
    pub string_table_size: u32,
    /// Byte size of the meta entries
    pub meta_entries_size: u32,
    /// Offset of the string table
    pub string_table_offset: u64,
    /// Offset of the meta entries
    pub meta_entries_offset: u64,
    /// Offset of the resource entry table
    pub resource_entries_offset: u64,
    /// Offset of the dependency block
    pub resource_deps_offset: u64,
    /// Offset of the special hashes
    pub resource_special_hash_offset: u64,
    /// Offset of the entry data region
    pub data_offset: u64,
}

impl ResourceHeader {
    /// Read and validate a header
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != RESOURCES_MAGIC {
            return Err(Error::InvalidMagic(magic));
        }

        let header = Self {
            version: reader.read_u32::<LittleEndian>()?,
            flags: reader.read_u32::<LittleEndian>()?,
            num_segments: reader.read_u32::<LittleEndian>()?,
            segment_size: reader.read_u64::<LittleEndian>()?,
            metadata_hash: reader.read_u64::<LittleEndian>()?,
            num_resources: reader.read_u32::<LittleEndian>()?,
            num_dependencies: reader.read_u32::<LittleEndian>()?,
            num_dep_indices: reader.read_u32::<LittleEndian>()?,
            num_string_indices: reader.read_u32::<LittleEndian>()?,
            num_special_hashes: reader.read_u32::<LittleEndian>()?,
            num_meta_entries: reader.read_u32::<LittleEndian>()?,
            string_table_size: reader.read_u32::<LittleEndian>()?,
            meta_entries_size: reader.read_u32::<LittleEndian>()?,
            string_table_offset: reader.read_u64::<LittleEndian>()?,
            meta_entries_offset: reader.read_u64::<LittleEndian>()?,
            resource_entries_offset: reader.read_u64::<LittleEndian>()?,
            resource_deps_offset: reader.read_u64::<LittleEndian>()?,
            resource_special_hash_offset: reader.read_u64::<LittleEndian>()?,
            data_offset: reader.read_u64::<LittleEndian>()?,
        };

        if header.version != RESOURCES_VERSION {
            log::debug!(
                "Unexpected resources version {} (expected {})",
                header.version,
                RESOURCES_VERSION
            );
        }

        Ok(header)
    }

    /// Write the header, magic included
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&RESOURCES_MAGIC)?;
        writer.write_u32::<LittleEndian>(self.version)?;
        writer.write_u32::<LittleEndian>(self.flags)?;
        writer.write_u32::<LittleEndian>(self.num_segments)?;
        writer.write_u64::<LittleEndian>(self.segment_size)?;
        writer.write_u64::<LittleEndian>(self.metadata_hash)?;
        writer.write_u32::<LittleEndian>(self.num_resources)?;
        writer.write_u32::<LittleEndian>(self.num_dependencies)?;
        writer.write_u32::<LittleEndian>(self.num_dep_indices)?;
        writer.write_u32::<LittleEndian>(self.num_string_indices)?;
        writer.write_u32::<LittleEndian>(self.num_special_hashes)?;
        writer.write_u32::<LittleEndian>(self.num_meta_entries)?;
        writer.write_u32::<LittleEndian>(self.string_table_size)?;
        writer.write_u32::<LittleEndian>(self.meta_entries_size)?;
        writer.write_u64::<LittleEndian>(self.string_table_offset)?;
        writer.write_u64::<LittleEndian>(self.meta_entries_offset)?;
        writer.write_u64::<LittleEndian>(self.resource_entries_offset)?;
        writer.write_u64::<LittleEndian>(self.resource_deps_offset)?;
        writer.write_u64::<LittleEndian>(self.resource_special_hash_offset)?;
        writer.write_u64::<LittleEndian>(self.data_offset)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_header_size() {
        let mut buf = Vec::new();
        ResourceHeader::default().write(&mut buf).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE);
        assert_eq!(&buf[..4], b"IDCL");
    }

    #[test]
    fn test_header_field_offsets() {
        let header = ResourceHeader {
            version: RESOURCES_VERSION,
            num_resources: 3,
            string_table_offset: 0x1000,
            data_offset: 0x2000,
            ..Default::default()
        };
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();

        assert_eq!(u32::from_le_bytes(buf[0x04..0x08].try_into().unwrap()), 12);
        assert_eq!(u32::from_le_bytes(buf[0x20..0x24].try_into().unwrap()), 3);
        assert_eq!(
            u64::from_le_bytes(buf[0x40..0x48].try_into().unwrap()),
            0x1000
        );
        assert_eq!(
            u64::from_le_bytes(buf[0x68..0x70].try_into().unwrap()),
            0x2000
        );

        let parsed = ResourceHeader::read(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_invalid_magic() {
        let mut buf = vec![0u8; HEADER_SIZE];
        buf[..4].copy_from_slice(b"MPQ\x1a");
        let err = ResourceHeader::read(&mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err, Error::InvalidMagic(m) if &m == b"MPQ\x1a"));
    }

    #[test]
    fn test_truncated_header() {
        let buf = b"IDCL\x0c\x00\x00\x00".to_vec();
        let err = ResourceHeader::read(&mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
