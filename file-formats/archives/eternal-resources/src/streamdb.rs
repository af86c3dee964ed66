//! STREAMDB payload framing
//!
//! A streamed geometry payload is prefixed by a small header:
//!
//! ```text
//! u64  magic        "STREAMDB"
//! u32  lod_count
//! lod_count x { u32 offset, u32 length }
//! ...  compressed bytes
//! ```
//!
//! The converter keeps a single LOD, so every LOD points at the same bytes.

use crate::compression::Codec;
use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Write};

/// `STREAMDB` as a little-endian u64
pub const STREAMDB_MAGIC: u64 = 0x4244_4D41_4552_5453;

/// LOD count written for converted meshes
pub const STREAMDB_LOD_COUNT: u32 = 3;

/// Location of one LOD inside a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LodSpan {
    /// Offset from the start of the payload file
    pub offset: u32,
    /// Compressed length
    pub length: u32,
}

/// A framed payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDbPayload {
    /// One span per LOD
    pub lods: Vec<LodSpan>,
    /// Compressed bytes following the header
    pub data: Vec<u8>,
}

/// Header length for a given LOD count
pub fn header_len(lod_count: u32) -> u32 {
    12 + 8 * lod_count
}

impl StreamDbPayload {
    /// Frame already-compressed bytes, all LODs sharing them
    pub fn shared(compressed: Vec<u8>, lod_count: u32) -> Result<Self> {
        let length = u32::try_from(compressed.len())
            .map_err(|_| Error::compression("compressed payload exceeds 4 GiB"))?;
        let span = LodSpan {
            offset: header_len(lod_count),
            length,
        };

        Ok(Self {
            lods: vec![span; lod_count as usize],
            data: compressed,
        })
    }

    /// Compress a geometry blob and frame it with [`STREAMDB_LOD_COUNT`] LODs
    pub fn compress(codec: &dyn Codec, raw: &[u8]) -> Result<Self> {
        let compressed = codec.compress(raw)?;
        log::debug!(
            "Framed {} byte geometry blob as {} compressed bytes ({})",
            raw.len(),
            compressed.len(),
            codec.name()
        );
        Self::shared(compressed, STREAMDB_LOD_COUNT)
    }

    /// Length of the compressed bytes
    pub fn compressed_len(&self) -> usize {
        self.data.len()
    }

    /// Serialize header and data
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u64::<LittleEndian>(STREAMDB_MAGIC)?;
        writer.write_u32::<LittleEndian>(self.lods.len() as u32)?;
        for lod in &self.lods {
            writer.write_u32::<LittleEndian>(lod.offset)?;
            writer.write_u32::<LittleEndian>(lod.length)?;
        }
        writer.write_all(&self.data)?;
        Ok(())
    }

    /// Serialize into a new buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let capacity = header_len(self.lods.len() as u32) as usize + self.data.len();
        let mut buf = Vec::with_capacity(capacity);
        self.write(&mut buf)?;
        Ok(buf)
    }

    /// Parse a framed payload
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let magic = cursor.read_u64::<LittleEndian>()?;
        if magic != STREAMDB_MAGIC {
            return Err(Error::invalid_format(format!(
                "bad STREAMDB magic {magic:#018x}"
            )));
        }

        let lod_count = cursor.read_u32::<LittleEndian>()?;
        let header = header_len(lod_count) as usize;
        if header > bytes.len() {
            return Err(Error::invalid_format(format!(
                "{lod_count} LODs do not fit in {} bytes",
                bytes.len()
            )));
        }

        let mut lods = Vec::with_capacity(lod_count as usize);
        for _ in 0..lod_count {
            let span = LodSpan {
                offset: cursor.read_u32::<LittleEndian>()?,
                length: cursor.read_u32::<LittleEndian>()?,
            };
            let end = span.offset as usize + span.length as usize;
            if (span.offset as usize) < header || end > bytes.len() {
                return Err(Error::invalid_format(format!(
                    "LOD span {}+{} outside payload of {} bytes",
                    span.offset,
                    span.length,
                    bytes.len()
                )));
            }
            lods.push(span);
        }

        Ok(Self {
            lods,
            data: bytes[header..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_magic_spells_streamdb() {
        assert_eq!(&STREAMDB_MAGIC.to_le_bytes(), b"STREAMDB");
        assert_eq!(STREAMDB_MAGIC, 4_775_026_447_650_804_819);
    }

    #[test]
    fn test_shared_layout() {
        let payload = StreamDbPayload::shared(vec![0xAA; 5], 3).unwrap();
        let bytes = payload.to_bytes().unwrap();

        let mut expected = b"STREAMDB".to_vec();
        expected.extend_from_slice(&3u32.to_le_bytes());
        for _ in 0..3 {
            expected.extend_from_slice(&36u32.to_le_bytes());
            expected.extend_from_slice(&5u32.to_le_bytes());
        }
        expected.extend_from_slice(&[0xAA; 5]);
        assert_eq!(bytes, expected);

        assert_eq!(StreamDbPayload::parse(&bytes).unwrap(), payload);
    }

    #[test]
    fn test_parse_rejects_bad_span() {
        let mut bytes = StreamDbPayload::shared(vec![1, 2, 3], 1)
            .unwrap()
            .to_bytes()
            .unwrap();
        // stretch the length past the end
        bytes[16..20].copy_from_slice(&100u32.to_le_bytes());
        assert!(StreamDbPayload::parse(&bytes).is_err());
    }

    #[test]
    fn test_parse_rejects_bad_magic() {
        let bytes = [0u8; 20];
        assert!(StreamDbPayload::parse(&bytes).unwrap_err().is_corruption());
    }
}
