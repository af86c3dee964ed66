//! Geometry unpacking and fixed-point packing
//!
//! [`UnpackedGeometry`] holds float attributes read from an OBJ document.
//! [`UnpackedGeometry::pack`] quantizes them into the streams the engine
//! reads from `.streamdb`:
//!
//! | Stream   | Per element                      | Bytes |
//! |----------|----------------------------------|-------|
//! | position | `x, y, z, 0` as u16              | 8     |
//! | normal   | `xn, yn, zn, 0, 0, 0, 0, 128`    | 8     |
//! | uv       | `u, v` as u16                    | 4     |
//! | color    | `r, g, b, a`                     | 4     |
//! | face     | three u16 indices                | 6     |
//!
//! Positions share one uniform scale so proportions survive quantization.

use crate::error::{LwoError, Result};
use byteorder::{LittleEndian, WriteBytesExt};
use eternal_obj::ObjDocument;
use eternal_obj::attributes::{parse_face, parse_vec2, parse_vec3};
use glam::{Vec2, Vec3};
use std::io::Write;

/// Largest vertex count 16-bit face indices can address
pub const MAX_VERTICES: usize = 65_535;

/// Color written for every vertex
pub const PLACEHOLDER_COLOR: [u8; 4] = [153, 153, 153, 255];

const QUANT_MAX: f32 = 65_535.0;
const NORMAL_MAX: f32 = 255.0;

fn remap_axes([x, y, z]: [f32; 3], y_up: bool) -> Vec3 {
    if y_up {
        Vec3::new(x, -z, y)
    } else {
        Vec3::new(x, y, z)
    }
}

/// Float geometry ready for packing
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnpackedGeometry {
    /// Positions
    pub vertices: Vec<Vec3>,
    /// Normals
    pub normals: Vec<Vec3>,
    /// Texture coordinates, already flipped to `v' = 1 - v`
    pub uvs: Vec<Vec2>,
    /// One color per vertex
    pub colors: Vec<[u8; 4]>,
    /// Zero-based triangles in engine winding
    pub faces: Vec<[u32; 3]>,
}

impl UnpackedGeometry {
    /// Interpret every group of `doc`, concatenated in file order
    ///
    /// With `y_up`, positions and normals are remapped as
    /// `(x, y, z) -> (x, -z, y)`. Face corners `a b c` are stored as
    /// `a c b`.
    pub fn from_obj(doc: &ObjDocument, y_up: bool) -> Result<Self> {
        let mut geometry = Self::default();

        for group in doc.groups() {
            for line in &group.vertices {
                geometry.vertices.push(remap_axes(parse_vec3(line)?, y_up));
            }
            for line in &group.uvs {
                let [u, v] = parse_vec2(line)?;
                geometry.uvs.push(Vec2::new(u, 1.0 - v));
            }
            for line in &group.normals {
                geometry.normals.push(remap_axes(parse_vec3(line)?, y_up));
            }
            for line in &group.faces {
                let [a, b, c] = parse_face(line)?;
                geometry.faces.push([a, c, b]);
            }
        }

        geometry.colors = vec![PLACEHOLDER_COLOR; geometry.vertices.len()];

        log::debug!(
            "Unpacked {} vertices, {} normals, {} uvs, {} faces from {} group(s)",
            geometry.vertices.len(),
            geometry.normals.len(),
            geometry.uvs.len(),
            geometry.faces.len(),
            doc.groups().len()
        );
        Ok(geometry)
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Fail with [`LwoError::TooManyVertices`] above [`MAX_VERTICES`]
    pub fn check_capacity(&self) -> Result<()> {
        if self.vertices.len() > MAX_VERTICES {
            return Err(LwoError::TooManyVertices(self.vertices.len()));
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.check_capacity()?;
        if self.vertices.is_empty() || self.faces.is_empty() {
            return Err(LwoError::EmptyGeometry);
        }

        let vertices = self.vertices.len();
        if self.normals.len() != vertices || self.uvs.len() != vertices {
            return Err(LwoError::AttributeMismatch {
                vertices,
                normals: self.normals.len(),
                uvs: self.uvs.len(),
            });
        }

        for (face, corners) in self.faces.iter().enumerate() {
            if let Some(&index) = corners.iter().find(|&&i| i as usize >= vertices) {
                return Err(LwoError::FaceIndexOutOfRange {
                    face,
                    index,
                    vertices,
                });
            }
        }
        Ok(())
    }

    /// Bounding box, uniform scale and UV minimum
    ///
    /// Returns `None` for geometry without vertices.
    pub fn bounds(&self) -> Option<GeometryBounds> {
        let first = *self.vertices.first()?;
        let (min, max) = self
            .vertices
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        let span = (max - min).max_element();
        let scale = if span > 0.0 { span } else { 1.0 };

        let min_uv = self
            .uvs
            .iter()
            .copied()
            .reduce(Vec2::min)
            .unwrap_or(Vec2::ZERO);

        Some(GeometryBounds {
            min,
            max,
            scale,
            min_uv,
        })
    }

    /// Quantize into the engine's fixed-point streams
    pub fn pack(&self) -> Result<(PackedGeometry, GeometryBounds)> {
        self.validate()?;
        let bounds = self.bounds().ok_or(LwoError::EmptyGeometry)?;

        let vertices = self
            .vertices
            .iter()
            .map(|&v| {
                let q = (v - bounds.min) / bounds.scale * QUANT_MAX;
                [quantize(q.x), quantize(q.y), quantize(q.z)]
            })
            .collect();

        let mut clamped_uvs = 0usize;
        let uvs = self
            .uvs
            .iter()
            .map(|&uv| {
                let q = (uv - bounds.min_uv) * QUANT_MAX;
                if q.max_element() > QUANT_MAX {
                    clamped_uvs += 1;
                }
                [quantize(q.x), quantize(q.y)]
            })
            .collect();
        if clamped_uvs > 0 {
            log::warn!("{clamped_uvs} UV coordinates span more than one tile and were clamped");
        }

        let normals = self
            .normals
            .iter()
            .map(|&n| {
                let q = (n + Vec3::ONE) / 2.0 * NORMAL_MAX;
                [
                    quantize_normal(q.x),
                    quantize_normal(q.y),
                    quantize_normal(q.z),
                ]
            })
            .collect();

        // validate() bounds every index below MAX_VERTICES
        let faces = self
            .faces
            .iter()
            .map(|f| [f[0] as u16, f[1] as u16, f[2] as u16])
            .collect();

        let packed = PackedGeometry {
            vertices,
            normals,
            uvs,
            colors: self.colors.clone(),
            faces,
        };

        log::debug!(
            "Packed {} vertices with scale {} from {:?}",
            packed.vertex_count(),
            bounds.scale,
            bounds.min
        );
        Ok((packed, bounds))
    }
}

fn quantize(value: f32) -> u16 {
    value.round().clamp(0.0, QUANT_MAX) as u16
}

fn quantize_normal(value: f32) -> u8 {
    value.round().clamp(0.0, NORMAL_MAX) as u8
}

/// Affine mapping between quantized and model space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryBounds {
    /// Per-axis minimum, also the position offset
    pub min: Vec3,
    /// Per-axis maximum
    pub max: Vec3,
    /// Largest per-axis span, 1 when all vertices coincide
    pub scale: f32,
    /// Per-axis UV minimum over the flipped coordinates
    pub min_uv: Vec2,
}

/// Byte offsets of each stream within the geometry blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOffsets {
    /// Start of the normals
    pub normal: u32,
    /// Start of the UVs
    pub uv: u32,
    /// Start of the colors
    pub color: u32,
    /// Start of the faces
    pub faces: u32,
}

/// Quantized geometry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackedGeometry {
    /// Quantized positions
    pub vertices: Vec<[u16; 3]>,
    /// Quantized normals
    pub normals: Vec<[u8; 3]>,
    /// Quantized UVs
    pub uvs: Vec<[u16; 2]>,
    /// Vertex colors
    pub colors: Vec<[u8; 4]>,
    /// Triangles
    pub faces: Vec<[u16; 3]>,
}

impl PackedGeometry {
    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Stream offsets for this vertex count
    pub fn stream_offsets(&self) -> StreamOffsets {
        let v = self.vertices.len() as u32;
        StreamOffsets {
            normal: v * 8,
            uv: v * 16,
            color: v * 20,
            faces: v * 24,
        }
    }

    /// Size of [`PackedGeometry::to_bytes`]
    pub fn byte_len(&self) -> usize {
        self.vertices.len() * 8
            + self.normals.len() * 8
            + self.uvs.len() * 4
            + self.colors.len() * 4
            + self.faces.len() * 6
    }

    /// Write the streams in engine order
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        for &[x, y, z] in &self.vertices {
            for value in [x, y, z, 0] {
                writer.write_u16::<LittleEndian>(value)?;
            }
        }
        for &[xn, yn, zn] in &self.normals {
            writer.write_all(&[xn, yn, zn, 0, 0, 0, 0, 128])?;
        }
        for &[u, v] in &self.uvs {
            writer.write_u16::<LittleEndian>(u)?;
            writer.write_u16::<LittleEndian>(v)?;
        }
        for color in &self.colors {
            writer.write_all(color)?;
        }
        for face in &self.faces {
            for &index in face {
                writer.write_u16::<LittleEndian>(index)?;
            }
        }
        Ok(())
    }

    /// Streams concatenated into one blob
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.byte_len());
        self.write(&mut buf)?;
        Ok(buf)
    }
}
