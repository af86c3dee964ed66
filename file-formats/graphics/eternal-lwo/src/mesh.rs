//! Mesh records and their LOD ("BML") records

use crate::error::{LwoError, Result};
use crate::header::LodLayout;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Size of one [`LodRecord`] on disk, without the reserved pair
pub const LOD_RECORD_SIZE: usize = 88;

/// Longest accepted material declaration
pub const MAX_MATERIAL_LENGTH: u32 = 1024;

/// Signature closing every LOD record
pub const LOD_SIGNATURE: [u8; 4] = *b"BMLr";

/// Default [`LodRecord::dummy_mask`]
pub const DEFAULT_DUMMY_MASK: u32 = 0xFFFF_FFFE;

/// Standard model version
pub const LWO_VERSION: u16 = 60;

/// Companion version word, always 2 in shipped models
pub const LWO_VERSION2: u16 = 2;

/// Level-of-detail record
///
/// Positions are stored quantized; `vertex_offset` and `vertex_scale` map them
/// back to model space, `uv_offset` and `uv_scale` do the same for UVs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodRecord {
    /// Padding
    pub null_pad: u32,
    /// Usually [`DEFAULT_DUMMY_MASK`]
    pub dummy_mask: u32,
    /// Vertex count
    pub num_vertices: u32,
    /// Face count times three
    pub num_faces_x3: u32,
    /// Model version, [`LWO_VERSION`] for standard models
    pub version: u16,
    /// Companion version word
    pub version2: u16,
    /// Bounding box minimum
    pub neg_bounds: [f32; 3],
    /// Bounding box maximum
    pub pos_bounds: [f32; 3],
    /// Added to dequantized positions
    pub vertex_offset: [f32; 3],
    /// Multiplies dequantized positions
    pub vertex_scale: f32,
    /// Added to dequantized UVs
    pub uv_offset: [f32; 2],
    /// Multiplies dequantized UVs
    pub uv_scale: f32,
    /// Unknown, copied forward when LODs are synthesized
    pub unk_floats: [f32; 3],
    /// Normally [`LOD_SIGNATURE`]
    pub signature: [u8; 4],
    /// Trailing pair, present on disk only in [`LodLayout::Extended`]
    pub reserved: [u32; 2],
}

impl Default for LodRecord {
    fn default() -> Self {
        Self {
            null_pad: 0,
            dummy_mask: DEFAULT_DUMMY_MASK,
            num_vertices: 0,
            num_faces_x3: 0,
            version: 0,
            version2: 0,
            neg_bounds: [0.0; 3],
            pos_bounds: [0.0; 3],
            vertex_offset: [0.0; 3],
            vertex_scale: 0.0,
            uv_offset: [0.0; 2],
            uv_scale: 0.0,
            unk_floats: [0.0; 3],
            signature: [0; 4],
            reserved: [0; 2],
        }
    }
}

fn read_f32s<R: Read, const N: usize>(reader: &mut R) -> Result<[f32; N]> {
    let mut out = [0.0f32; N];
    for value in &mut out {
        *value = reader.read_f32::<LittleEndian>()?;
    }
    Ok(out)
}

fn write_f32s<W: Write>(writer: &mut W, values: &[f32]) -> Result<()> {
    for &value in values {
        writer.write_f32::<LittleEndian>(value)?;
    }
    Ok(())
}

impl LodRecord {
    /// Read one record in the given layout
    pub fn read<R: Read>(reader: &mut R, layout: LodLayout) -> Result<Self> {
        let null_pad = reader.read_u32::<LittleEndian>()?;
        let dummy_mask = reader.read_u32::<LittleEndian>()?;
        let num_vertices = reader.read_u32::<LittleEndian>()?;
        let num_faces_x3 = reader.read_u32::<LittleEndian>()?;
        let version = reader.read_u16::<LittleEndian>()?;
        let version2 = reader.read_u16::<LittleEndian>()?;
        let neg_bounds = read_f32s::<_, 3>(reader)?;
        let pos_bounds = read_f32s::<_, 3>(reader)?;
        let vertex_offset = read_f32s::<_, 3>(reader)?;
        let vertex_scale = reader.read_f32::<LittleEndian>()?;
        let uv_offset = read_f32s::<_, 2>(reader)?;
        let uv_scale = reader.read_f32::<LittleEndian>()?;
        let unk_floats = read_f32s::<_, 3>(reader)?;
        let mut signature = [0u8; 4];
        reader.read_exact(&mut signature)?;

        let mut reserved = [0u32; 2];
        if layout.has_reserved_pair() {
            reserved[0] = reader.read_u32::<LittleEndian>()?;
            reserved[1] = reader.read_u32::<LittleEndian>()?;
        }

        Ok(Self {
            null_pad,
            dummy_mask,
            num_vertices,
            num_faces_x3,
            version,
            version2,
            neg_bounds,
            pos_bounds,
            vertex_offset,
            vertex_scale,
            uv_offset,
            uv_scale,
            unk_floats,
            signature,
            reserved,
        })
    }

    /// Write one record in the given layout
    pub fn write<W: Write>(&self, writer: &mut W, layout: LodLayout) -> Result<()> {
        writer.write_u32::<LittleEndian>(self.null_pad)?;
        writer.write_u32::<LittleEndian>(self.dummy_mask)?;
        writer.write_u32::<LittleEndian>(self.num_vertices)?;
        writer.write_u32::<LittleEndian>(self.num_faces_x3)?;
        writer.write_u16::<LittleEndian>(self.version)?;
        writer.write_u16::<LittleEndian>(self.version2)?;
        write_f32s(writer, &self.neg_bounds)?;
        write_f32s(writer, &self.pos_bounds)?;
        write_f32s(writer, &self.vertex_offset)?;
        writer.write_f32::<LittleEndian>(self.vertex_scale)?;
        write_f32s(writer, &self.uv_offset)?;
        writer.write_f32::<LittleEndian>(self.uv_scale)?;
        write_f32s(writer, &self.unk_floats)?;
        writer.write_all(&self.signature)?;

        if layout.has_reserved_pair() {
            writer.write_u32::<LittleEndian>(self.reserved[0])?;
            writer.write_u32::<LittleEndian>(self.reserved[1])?;
        }
        Ok(())
    }

    /// Blank record that keeps only the unknown floats of `source`
    pub fn derived_from(source: &LodRecord) -> Self {
        Self {
            unk_floats: source.unk_floats,
            signature: LOD_SIGNATURE,
            ..Default::default()
        }
    }

    /// Number of faces described
    pub fn face_count(&self) -> u32 {
        self.num_faces_x3 / 3
    }
}

/// One mesh record
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LwoMesh {
    /// Unknown
    pub unk_int1: u32,
    /// Unknown
    pub unk_int2: u32,
    /// Material declaration path, e.g. `models/crates/crate_01`
    pub material: String,
    /// Unknown
    pub unk_int3: u32,
    /// Unknown
    pub dummy1: u32,
    /// Padding
    pub null_pad: u32,
    /// LOD records; the count is fixed by the layout
    pub lods: Vec<LodRecord>,
}

impl LwoMesh {
    /// Read a mesh record
    ///
    /// A declared material length above [`MAX_MATERIAL_LENGTH`] fails with
    /// [`LwoError::InvalidMaterialLength`] before anything else is read.
    pub fn read<R: Read>(reader: &mut R, layout: LodLayout) -> Result<Self> {
        let unk_int1 = reader.read_u32::<LittleEndian>()?;
        let unk_int2 = reader.read_u32::<LittleEndian>()?;
        let decl_strlen = reader.read_u32::<LittleEndian>()?;
        if decl_strlen > MAX_MATERIAL_LENGTH {
            return Err(LwoError::InvalidMaterialLength {
                length: decl_strlen as usize,
                max: MAX_MATERIAL_LENGTH,
            });
        }

        let mut material = vec![0u8; decl_strlen as usize];
        reader.read_exact(&mut material)?;
        let material = String::from_utf8_lossy(&material).into_owned();

        let unk_int3 = reader.read_u32::<LittleEndian>()?;
        let dummy1 = reader.read_u32::<LittleEndian>()?;
        let null_pad = reader.read_u32::<LittleEndian>()?;

        let lods = (0..layout.lod_count())
            .map(|_| LodRecord::read(reader, layout))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            unk_int1,
            unk_int2,
            material,
            unk_int3,
            dummy1,
            null_pad,
            lods,
        })
    }

    /// Write a mesh record
    pub fn write<W: Write>(&self, writer: &mut W, layout: LodLayout) -> Result<()> {
        let decl_strlen = self.material.len();
        if decl_strlen > MAX_MATERIAL_LENGTH as usize {
            return Err(LwoError::InvalidMaterialLength {
                length: decl_strlen,
                max: MAX_MATERIAL_LENGTH,
            });
        }
        if self.lods.len() != layout.lod_count() {
            return Err(LwoError::UnsupportedLodCount {
                layout: layout.name(),
                expected: layout.lod_count(),
                actual: self.lods.len(),
            });
        }

        writer.write_u32::<LittleEndian>(self.unk_int1)?;
        writer.write_u32::<LittleEndian>(self.unk_int2)?;
        writer.write_u32::<LittleEndian>(decl_strlen as u32)?;
        writer.write_all(self.material.as_bytes())?;
        writer.write_u32::<LittleEndian>(self.unk_int3)?;
        writer.write_u32::<LittleEndian>(self.dummy1)?;
        writer.write_u32::<LittleEndian>(self.null_pad)?;
        for lod in &self.lods {
            lod.write(writer, layout)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn sample_lod() -> LodRecord {
        LodRecord {
            num_vertices: 24,
            num_faces_x3: 36,
            version: LWO_VERSION,
            version2: LWO_VERSION2,
            neg_bounds: [-1.0, -1.0, -1.0],
            pos_bounds: [1.0, 1.0, 1.0],
            vertex_offset: [-1.0, -1.0, -1.0],
            vertex_scale: 2.0,
            uv_scale: 1.0,
            unk_floats: [0.5, 0.25, 0.125],
            signature: LOD_SIGNATURE,
            ..Default::default()
        }
    }

    #[test]
    fn test_lod_record_size() {
        let mut standard = Vec::new();
        sample_lod().write(&mut standard, LodLayout::Standard).unwrap();
        assert_eq!(standard.len(), LOD_RECORD_SIZE);

        let mut extended = Vec::new();
        sample_lod().write(&mut extended, LodLayout::Extended).unwrap();
        assert_eq!(extended.len(), LOD_RECORD_SIZE + 8);
    }

    #[test]
    fn test_lod_signature_position() {
        let mut buf = Vec::new();
        sample_lod().write(&mut buf, LodLayout::Standard).unwrap();
        assert_eq!(&buf[84..88], b"BMLr");
        assert_eq!(&buf[4..8], &DEFAULT_DUMMY_MASK.to_le_bytes());
    }

    #[test]
    fn test_extended_reserved_pair() {
        let lod = LodRecord {
            reserved: [7, 9],
            ..sample_lod()
        };
        let mut buf = Vec::new();
        lod.write(&mut buf, LodLayout::Extended).unwrap();
        let parsed = LodRecord::read(&mut Cursor::new(&buf), LodLayout::Extended).unwrap();
        assert_eq!(parsed, lod);
    }

    #[test]
    fn test_derived_lod() {
        let derived = LodRecord::derived_from(&sample_lod());
        assert_eq!(derived.unk_floats, [0.5, 0.25, 0.125]);
        assert_eq!(derived.signature, LOD_SIGNATURE);
        assert_eq!(derived.dummy_mask, DEFAULT_DUMMY_MASK);
        assert_eq!(derived.num_vertices, 0);
    }

    #[test]
    fn test_mesh_read_write() {
        let mesh = LwoMesh {
            unk_int1: 1,
            unk_int2: 2,
            material: "models/crates/crate_01".to_string(),
            unk_int3: 3,
            lods: vec![sample_lod(); 3],
            ..Default::default()
        };
        let mut buf = Vec::new();
        mesh.write(&mut buf, LodLayout::Standard).unwrap();
        assert_eq!(buf.len(), 12 + 22 + 12 + 3 * LOD_RECORD_SIZE);

        let parsed = LwoMesh::read(&mut Cursor::new(&buf), LodLayout::Standard).unwrap();
        assert_eq!(parsed, mesh);
    }

    #[test]
    fn test_mesh_rejects_long_material() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&2000u32.to_le_bytes());
        let err = LwoMesh::read(&mut Cursor::new(&buf), LodLayout::Standard).unwrap_err();
        assert!(matches!(
            err,
            LwoError::InvalidMaterialLength { length: 2000, .. }
        ));

        let mesh = LwoMesh {
            material: "m".repeat(1025),
            lods: vec![sample_lod(); 3],
            ..Default::default()
        };
        assert!(matches!(
            mesh.write(&mut Vec::new(), LodLayout::Standard),
            Err(LwoError::InvalidMaterialLength { length: 1025, .. })
        ));
    }

    #[test]
    fn test_mesh_lod_count_must_match_layout() {
        let mesh = LwoMesh {
            lods: vec![sample_lod(); 2],
            ..Default::default()
        };
        let err = mesh.write(&mut Vec::new(), LodLayout::Standard).unwrap_err();
        assert!(matches!(
            err,
            LwoError::UnsupportedLodCount {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }
}
