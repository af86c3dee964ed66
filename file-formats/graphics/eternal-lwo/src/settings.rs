//! Global settings blocks that follow the mesh records

use crate::error::Result;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Settings block written right after the last mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LwoSettings {
    /// Unknown
    pub unk_int6: u32,
    /// Unknown
    pub unk_int7: u32,
    /// Non-zero when an extra section follows in native models
    pub unk_file_id: u32,
    /// `0xFFFF` when `unk_file_id` is zero
    pub unk_int8: u32,
    /// `0xFFFF` when `unk_file_id` is zero
    pub unk_int9: u32,
    /// Unknown flag
    pub unk_flag1: u32,
}

impl LwoSettings {
    /// Size on disk
    pub const SIZE: usize = 24;

    /// Read the block
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            unk_int6: reader.read_u32::<LittleEndian>()?,
            unk_int7: reader.read_u32::<LittleEndian>()?,
            unk_file_id: reader.read_u32::<LittleEndian>()?,
            unk_int8: reader.read_u32::<LittleEndian>()?,
            unk_int9: reader.read_u32::<LittleEndian>()?,
            unk_flag1: reader.read_u32::<LittleEndian>()?,
        })
    }

    /// Write the block
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        for value in [
            self.unk_int6,
            self.unk_int7,
            self.unk_file_id,
            self.unk_int8,
            self.unk_int9,
            self.unk_flag1,
        ] {
            writer.write_u32::<LittleEndian>(value)?;
        }
        Ok(())
    }
}

/// Byte flags written before the stream slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LwoSettings2 {
    /// Unknown
    pub unk_bool_0_1: u8,
    /// Unknown
    pub unk_bool_0_2: u8,
    /// Unknown
    pub unk_bool_0_3: u8,
    /// Tangent bump placeholder
    pub tangent_bump_dummy: u8,
    /// Render bump maps
    pub render_bump: u8,
    /// Generate a lightmap unwrap
    pub generate_unwrap: u8,
    /// Surface carries lightmap UVs
    pub surface_has_lightmap_uvs: u8,
    /// Vertex streams are compressed; must be 0 for a single-mesh model
    pub compress_vertex_streams: u8,
    /// Multi-layer material; must be 0 for a single-mesh model
    pub use_multi_layer: u8,
}

impl Default for LwoSettings2 {
    fn default() -> Self {
        Self {
            unk_bool_0_1: 0,
            unk_bool_0_2: 1,
            unk_bool_0_3: 0,
            tangent_bump_dummy: 0,
            render_bump: 1,
            generate_unwrap: 1,
            surface_has_lightmap_uvs: 1,
            compress_vertex_streams: 0,
            use_multi_layer: 0,
        }
    }
}

impl LwoSettings2 {
    /// Size on disk
    pub const SIZE: usize = 9;

    /// Read the flags
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut b = [0u8; Self::SIZE];
        reader.read_exact(&mut b)?;
        Ok(Self {
            unk_bool_0_1: b[0],
            unk_bool_0_2: b[1],
            unk_bool_0_3: b[2],
            tangent_bump_dummy: b[3],
            render_bump: b[4],
            generate_unwrap: b[5],
            surface_has_lightmap_uvs: b[6],
            compress_vertex_streams: b[7],
            use_multi_layer: b[8],
        })
    }

    /// Write the flags
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&[
            self.unk_bool_0_1,
            self.unk_bool_0_2,
            self.unk_bool_0_3,
            self.tangent_bump_dummy,
            self.render_bump,
            self.generate_unwrap,
            self.surface_has_lightmap_uvs,
            self.compress_vertex_streams,
            self.use_multi_layer,
        ])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_settings_round_trip() {
        let settings = LwoSettings {
            unk_file_id: 0,
            unk_int8: 0xFFFF,
            unk_int9: 0xFFFF,
            unk_flag1: 1,
            ..Default::default()
        };
        let mut buf = Vec::new();
        settings.write(&mut buf).unwrap();
        assert_eq!(buf.len(), LwoSettings::SIZE);
        assert_eq!(LwoSettings::read(&mut Cursor::new(&buf)).unwrap(), settings);
    }

    #[test]
    fn test_settings2_defaults() {
        let mut buf = Vec::new();
        LwoSettings2::default().write(&mut buf).unwrap();
        assert_eq!(buf, vec![0, 1, 0, 0, 1, 1, 1, 0, 0]);
    }

    #[test]
    fn test_settings2_truncated() {
        assert!(LwoSettings2::read(&mut Cursor::new(&[0u8; 4])).is_err());
    }
}
