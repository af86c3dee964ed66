//! Fixed file header and the LOD layout it selects

use crate::error::Result;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::{Read, Write};

/// Size of [`LwoHeader`] on disk
pub const HEADER_SIZE: usize = 36;

/// Selector written when a header switches to the standard layout
///
/// Any non-zero value selects [`LodLayout::Standard`].
pub const STANDARD_SELECTOR: u64 = 1;

/// Shape of the LOD records in every mesh
///
/// Resolved once from [`LwoHeader::selector_hash`] and carried through the
/// rest of decoding and encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LodLayout {
    /// Three LOD records per mesh
    #[default]
    Standard,
    /// One LOD record per mesh, each followed by two reserved words
    Extended,
}

impl LodLayout {
    /// LOD records per mesh
    pub fn lod_count(self) -> usize {
        match self {
            LodLayout::Standard => 3,
            LodLayout::Extended => 1,
        }
    }

    /// Whether each LOD record is followed by a reserved pair
    pub fn has_reserved_pair(self) -> bool {
        self == LodLayout::Extended
    }

    /// Short name for messages
    pub fn name(self) -> &'static str {
        match self {
            LodLayout::Standard => "standard",
            LodLayout::Extended => "extended",
        }
    }
}

impl fmt::Display for LodLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// LWO file header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LwoHeader {
    /// Leading padding
    pub null_pad64: u64,
    /// Padding
    pub null_pad32_0: u32,
    /// File type word
    pub file_type: u32,
    /// Number of mesh records that follow
    pub num_meshes: u32,
    /// Padding
    pub null_pad32_1: u32,
    /// Zero selects the extended LOD layout
    pub selector_hash: u64,
    /// Must be zero
    pub null_pad32_2: u32,
}

impl LwoHeader {
    /// Read the header
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            null_pad64: reader.read_u64::<LittleEndian>()?,
            null_pad32_0: reader.read_u32::<LittleEndian>()?,
            file_type: reader.read_u32::<LittleEndian>()?,
            num_meshes: reader.read_u32::<LittleEndian>()?,
            null_pad32_1: reader.read_u32::<LittleEndian>()?,
            selector_hash: reader.read_u64::<LittleEndian>()?,
            null_pad32_2: reader.read_u32::<LittleEndian>()?,
        })
    }

    /// Write the header
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u64::<LittleEndian>(self.null_pad64)?;
        writer.write_u32::<LittleEndian>(self.null_pad32_0)?;
        writer.write_u32::<LittleEndian>(self.file_type)?;
        writer.write_u32::<LittleEndian>(self.num_meshes)?;
        writer.write_u32::<LittleEndian>(self.null_pad32_1)?;
        writer.write_u64::<LittleEndian>(self.selector_hash)?;
        writer.write_u32::<LittleEndian>(self.null_pad32_2)?;
        Ok(())
    }

    /// LOD layout selected by this header
    pub fn layout(&self) -> LodLayout {
        if self.selector_hash == 0 {
            LodLayout::Extended
        } else {
            LodLayout::Standard
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_header_size() {
        let mut buf = Vec::new();
        LwoHeader::default().write(&mut buf).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE);
    }

    #[test]
    fn test_header_field_order() {
        let header = LwoHeader {
            file_type: 0x11,
            num_meshes: 2,
            selector_hash: 0xAABB_CCDD_EEFF_0011,
            ..Default::default()
        };
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();

        assert_eq!(&buf[12..16], &0x11u32.to_le_bytes());
        assert_eq!(&buf[16..20], &2u32.to_le_bytes());
        assert_eq!(&buf[24..32], &0xAABB_CCDD_EEFF_0011u64.to_le_bytes());

        let parsed = LwoHeader::read(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_layout_selection() {
        let mut header = LwoHeader::default();
        assert_eq!(header.layout(), LodLayout::Extended);
        assert_eq!(header.layout().lod_count(), 1);
        assert!(header.layout().has_reserved_pair());

        header.selector_hash = 1;
        assert_eq!(header.layout(), LodLayout::Standard);
        assert_eq!(header.layout().lod_count(), 3);
        assert!(!header.layout().has_reserved_pair());
    }
}
