//! Stream descriptor slots
//!
//! Every header ends with exactly [`STREAM_SLOT_COUNT`] slots. Each slot is a
//! descriptor header, the per-stream strides and offsets, and the on-disk
//! layout of the compressed geometry in the `.streamdb` container.

use crate::error::{LwoError, Result};
use crate::mesh::{LWO_VERSION, LWO_VERSION2};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Stream slots in every header
pub const STREAM_SLOT_COUNT: usize = 5;

/// Offset count of a standard slot
pub const STANDARD_OFFSET_COUNT: u32 = 4;

/// Offset count of a slot carrying a lightmap UV stream
pub const LIGHTMAP_OFFSET_COUNT: u32 = 5;

/// Stream is stored uncompressed
pub const COMPRESSION_NONE: u32 = 3;

/// Stream is Kraken compressed
pub const COMPRESSION_KRAKEN: u32 = 4;

/// Descriptor header of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    /// Always 1
    pub num_streams: u32,
    /// 60 normally, 124 with a lightmap UV stream
    pub version: u16,
    /// Companion version word
    pub version2: u16,
    /// Size of the decompressed geometry blob
    pub decompressed_size: u32,
    /// [`STANDARD_OFFSET_COUNT`] or [`LIGHTMAP_OFFSET_COUNT`]
    pub num_offsets: u32,
}

impl Default for StreamHeader {
    fn default() -> Self {
        Self {
            num_streams: 1,
            version: LWO_VERSION,
            version2: LWO_VERSION2,
            decompressed_size: 0,
            num_offsets: STANDARD_OFFSET_COUNT,
        }
    }
}

/// Lightmap UV stream of the 124 variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightmapStream {
    /// Stride word
    pub stride: u32,
    /// Start offset
    pub offset: u32,
}

impl Default for LightmapStream {
    fn default() -> Self {
        Self {
            stride: 64,
            offset: 0,
        }
    }
}

/// Stream strides and start offsets within the geometry blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamData {
    /// Normal stream word
    pub unk_normal: u32,
    /// UV stream word
    pub unk_uv: u32,
    /// Present iff the header has [`LIGHTMAP_OFFSET_COUNT`] offsets
    pub lightmap: Option<LightmapStream>,
    /// Color stream word
    pub unk_color: u32,
    /// Face stream word
    pub unk_faces: u32,
    /// Unknown
    pub unk_int99: u32,
    /// Byte offset of the normals
    pub normal_offset: u32,
    /// Byte offset of the UVs
    pub uv_offset: u32,
    /// Byte offset of the colors
    pub color_offset: u32,
    /// Byte offset of the faces
    pub faces_offset: u32,
}

impl Default for StreamData {
    fn default() -> Self {
        Self {
            unk_normal: 32,
            unk_uv: 20,
            lightmap: None,
            unk_color: 131_072,
            unk_faces: 8,
            unk_int99: 0,
            normal_offset: 0,
            uv_offset: 0,
            color_offset: 0,
            faces_offset: 0,
        }
    }
}

/// Placement of one stream in the `.streamdb` container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDiskLayout {
    /// [`COMPRESSION_NONE`] or [`COMPRESSION_KRAKEN`]
    pub compression_type: u32,
    /// Bytes after decompression
    pub decompressed_size: u32,
    /// Bytes on disk
    pub compressed_size: u32,
    /// Sum of the compressed sizes of all preceding slots
    pub cumulative_compressed_size: u32,
}

impl Default for StreamDiskLayout {
    fn default() -> Self {
        Self {
            compression_type: COMPRESSION_NONE,
            decompressed_size: 0,
            compressed_size: 0,
            cumulative_compressed_size: 0,
        }
    }
}

/// One stream slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamSlot {
    /// Descriptor header
    pub header: StreamHeader,
    /// Strides and offsets
    pub data: StreamData,
    /// On-disk placement
    pub layout: StreamDiskLayout,
}

impl StreamSlot {
    /// Read the slot at position `index`
    pub fn read<R: Read>(reader: &mut R, index: usize) -> Result<Self> {
        let header = StreamHeader {
            num_streams: reader.read_u32::<LittleEndian>()?,
            version: reader.read_u16::<LittleEndian>()?,
            version2: reader.read_u16::<LittleEndian>()?,
            decompressed_size: reader.read_u32::<LittleEndian>()?,
            num_offsets: reader.read_u32::<LittleEndian>()?,
        };

        let has_lightmap = match header.num_offsets {
            STANDARD_OFFSET_COUNT => false,
            LIGHTMAP_OFFSET_COUNT => true,
            _ => return Err(LwoError::InconsistentStreamSlot(index)),
        };

        let unk_normal = reader.read_u32::<LittleEndian>()?;
        let unk_uv = reader.read_u32::<LittleEndian>()?;
        let lightmap_stride = if has_lightmap {
            Some(reader.read_u32::<LittleEndian>()?)
        } else {
            None
        };
        let unk_color = reader.read_u32::<LittleEndian>()?;
        let unk_faces = reader.read_u32::<LittleEndian>()?;
        let unk_int99 = reader.read_u32::<LittleEndian>()?;
        let normal_offset = reader.read_u32::<LittleEndian>()?;
        let uv_offset = reader.read_u32::<LittleEndian>()?;
        let lightmap = match lightmap_stride {
            Some(stride) => Some(LightmapStream {
                stride,
                offset: reader.read_u32::<LittleEndian>()?,
            }),
            None => None,
        };
        let color_offset = reader.read_u32::<LittleEndian>()?;
        let faces_offset = reader.read_u32::<LittleEndian>()?;

        let layout = StreamDiskLayout {
            compression_type: reader.read_u32::<LittleEndian>()?,
            decompressed_size: reader.read_u32::<LittleEndian>()?,
            compressed_size: reader.read_u32::<LittleEndian>()?,
            cumulative_compressed_size: reader.read_u32::<LittleEndian>()?,
        };

        Ok(Self {
            header,
            data: StreamData {
                unk_normal,
                unk_uv,
                lightmap,
                unk_color,
                unk_faces,
                unk_int99,
                normal_offset,
                uv_offset,
                color_offset,
                faces_offset,
            },
            layout,
        })
    }

    /// Write the slot at position `index`
    pub fn write<W: Write>(&self, writer: &mut W, index: usize) -> Result<()> {
        let expects_lightmap = self.header.num_offsets == LIGHTMAP_OFFSET_COUNT;
        let valid_count = matches!(
            self.header.num_offsets,
            STANDARD_OFFSET_COUNT | LIGHTMAP_OFFSET_COUNT
        );
        if !valid_count || expects_lightmap != self.data.lightmap.is_some() {
            return Err(LwoError::InconsistentStreamSlot(index));
        }

        let h = &self.header;
        writer.write_u32::<LittleEndian>(h.num_streams)?;
        writer.write_u16::<LittleEndian>(h.version)?;
        writer.write_u16::<LittleEndian>(h.version2)?;
        writer.write_u32::<LittleEndian>(h.decompressed_size)?;
        writer.write_u32::<LittleEndian>(h.num_offsets)?;

        let d = &self.data;
        writer.write_u32::<LittleEndian>(d.unk_normal)?;
        writer.write_u32::<LittleEndian>(d.unk_uv)?;
        if let Some(lightmap) = d.lightmap {
            writer.write_u32::<LittleEndian>(lightmap.stride)?;
        }
        writer.write_u32::<LittleEndian>(d.unk_color)?;
        writer.write_u32::<LittleEndian>(d.unk_faces)?;
        writer.write_u32::<LittleEndian>(d.unk_int99)?;
        writer.write_u32::<LittleEndian>(d.normal_offset)?;
        writer.write_u32::<LittleEndian>(d.uv_offset)?;
        if let Some(lightmap) = d.lightmap {
            writer.write_u32::<LittleEndian>(lightmap.offset)?;
        }
        writer.write_u32::<LittleEndian>(d.color_offset)?;
        writer.write_u32::<LittleEndian>(d.faces_offset)?;

        let l = &self.layout;
        writer.write_u32::<LittleEndian>(l.compression_type)?;
        writer.write_u32::<LittleEndian>(l.decompressed_size)?;
        writer.write_u32::<LittleEndian>(l.compressed_size)?;
        writer.write_u32::<LittleEndian>(l.cumulative_compressed_size)?;
        Ok(())
    }

    /// Bytes this slot occupies on disk
    pub fn size(&self) -> usize {
        let base = 16 + 36 + 16;
        if self.data.lightmap.is_some() {
            base + 8
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn lightmap_slot() -> StreamSlot {
        StreamSlot {
            header: StreamHeader {
                version: 124,
                num_offsets: LIGHTMAP_OFFSET_COUNT,
                ..Default::default()
            },
            data: StreamData {
                lightmap: Some(LightmapStream {
                    stride: 64,
                    offset: 400,
                }),
                normal_offset: 80,
                uv_offset: 160,
                color_offset: 440,
                faces_offset: 480,
                ..Default::default()
            },
            layout: StreamDiskLayout {
                compression_type: COMPRESSION_KRAKEN,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_standard_slot_size() {
        let mut buf = Vec::new();
        StreamSlot::default().write(&mut buf, 0).unwrap();
        assert_eq!(buf.len(), 68);
        assert_eq!(buf.len(), StreamSlot::default().size());
        // num_offsets sits after num_streams, versions and size
        assert_eq!(&buf[12..16], &4u32.to_le_bytes());
    }

    #[test]
    fn test_lightmap_slot_round_trip() {
        let slot = lightmap_slot();
        let mut buf = Vec::new();
        slot.write(&mut buf, 2).unwrap();
        assert_eq!(buf.len(), 76);

        // stride sits between the UV and color words
        assert_eq!(&buf[24..28], &64u32.to_le_bytes());
        // lightmap offset sits between the UV and color offsets
        assert_eq!(&buf[48..52], &400u32.to_le_bytes());

        let parsed = StreamSlot::read(&mut Cursor::new(&buf), 2).unwrap();
        assert_eq!(parsed, slot);
    }

    #[test]
    fn test_inconsistent_slot() {
        let mut slot = lightmap_slot();
        slot.data.lightmap = None;
        assert!(matches!(
            slot.write(&mut Vec::new(), 3),
            Err(LwoError::InconsistentStreamSlot(3))
        ));

        let mut slot = StreamSlot::default();
        slot.header.num_offsets = 7;
        assert!(matches!(
            slot.write(&mut Vec::new(), 1),
            Err(LwoError::InconsistentStreamSlot(1))
        ));
    }

    #[test]
    fn test_read_rejects_unknown_offset_count() {
        let mut buf = Vec::new();
        StreamSlot::default().write(&mut buf, 0).unwrap();
        buf[12..16].copy_from_slice(&9u32.to_le_bytes());
        assert!(matches!(
            StreamSlot::read(&mut Cursor::new(&buf), 4),
            Err(LwoError::InconsistentStreamSlot(4))
        ));
    }
}
