//! Replacement header construction
//!
//! A converted model reuses the header of the entry it replaces. The source
//! model is left untouched; [`HeaderRewrite::apply`] derives a new one that
//! describes a single mesh with three identical LODs pointing at the packed
//! geometry.
//!
//! Only the header, the mesh records and the settings block are taken from
//! the source. The flags and the five stream slots after them are rebuilt
//! from defaults, since native tails describe streams the new payload does
//! not have.

use crate::error::{LwoError, Result};
use crate::geometry::{GeometryBounds, PackedGeometry, StreamOffsets};
use crate::header::{LodLayout, STANDARD_SELECTOR};
use crate::mesh::{LWO_VERSION, LWO_VERSION2, LodRecord, MAX_MATERIAL_LENGTH};
use crate::model::LwoModel;
use crate::settings::LwoSettings2;
use crate::stream::{COMPRESSION_KRAKEN, STREAM_SLOT_COUNT, StreamSlot};

/// Stream slots that describe the three LODs
const LOD_SLOT_COUNT: usize = 3;

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Recompute each slot's cumulative compressed size
///
/// Slot `i` receives slot `i - 1`'s cumulative size plus its compressed
/// size. The first slot is left as it is.
pub fn recompute_cumulative_sizes(slots: &mut [StreamSlot]) {
    for i in 1..slots.len() {
        let previous = slots[i - 1].layout;
        slots[i].layout.cumulative_compressed_size = previous
            .cumulative_compressed_size
            .wrapping_add(previous.compressed_size);
    }
}

/// Builder for a replacement header
#[derive(Debug, Clone)]
pub struct HeaderRewrite {
    material: String,
    vertex_count: u32,
    face_count: u32,
    bounds: GeometryBounds,
    offsets: StreamOffsets,
    decompressed_size: u32,
    compressed_size: u32,
}

impl HeaderRewrite {
    /// Describe `packed` with material declaration `material`
    pub fn new(material: impl Into<String>, packed: &PackedGeometry, bounds: GeometryBounds) -> Self {
        let decompressed_size = to_u32(packed.byte_len());
        Self {
            material: material.into(),
            vertex_count: to_u32(packed.vertex_count()),
            face_count: to_u32(packed.face_count()),
            bounds,
            offsets: packed.stream_offsets(),
            decompressed_size,
            compressed_size: decompressed_size,
        }
    }

    /// Size of the compressed geometry in the `.streamdb` payload
    ///
    /// Defaults to the decompressed size.
    pub fn compressed_size(mut self, size: usize) -> Self {
        self.compressed_size = to_u32(size);
        self
    }

    /// Derive the replacement header from `source`
    pub fn apply(&self, source: &LwoModel) -> Result<LwoModel> {
        if self.material.len() > MAX_MATERIAL_LENGTH as usize {
            return Err(LwoError::InvalidMaterialLength {
                length: self.material.len(),
                max: MAX_MATERIAL_LENGTH,
            });
        }

        let mut model = source.clone();
        if model.meshes.is_empty() {
            return Err(LwoError::NoMeshes);
        }

        model.header.num_meshes = 1;
        model.meshes.truncate(1);
        let mesh = &mut model.meshes[0];
        mesh.material.clone_from(&self.material);

        let template = mesh.lods.first().copied().unwrap_or_default();
        if mesh.lods.len() < 3 {
            log::debug!("Synthesizing {} LOD records", 3 - mesh.lods.len());
        }
        mesh.lods.truncate(3);
        while mesh.lods.len() < 3 {
            mesh.lods.push(LodRecord::derived_from(&template));
        }

        if model.layout == LodLayout::Extended {
            log::warn!("Source header uses the extended LOD layout, writing standard records");
        }
        model.layout = LodLayout::Standard;
        if model.header.layout() != LodLayout::Standard {
            model.header.selector_hash = STANDARD_SELECTOR;
        }

        let b = &self.bounds;
        for lod in &mut mesh.lods {
            lod.num_vertices = self.vertex_count;
            lod.num_faces_x3 = self.face_count.saturating_mul(3);
            lod.neg_bounds = b.min.to_array();
            lod.pos_bounds = b.max.to_array();
            lod.vertex_offset = b.min.to_array();
            lod.uv_offset = b.min_uv.to_array();
            lod.vertex_scale = b.scale;
            lod.uv_scale = 1.0;
            lod.version = LWO_VERSION;
            lod.version2 = LWO_VERSION2;
        }

        model.chunks.clear();
        model.mesh_name.clear();

        // must be zero for a single-mesh model
        model.settings2 = LwoSettings2::default();
        model.settings2.compress_vertex_streams = 0;
        model.settings2.use_multi_layer = 0;

        // the last two slots stay empty
        model.stream_slots = [StreamSlot::default(); STREAM_SLOT_COUNT];
        for slot in &mut model.stream_slots[..LOD_SLOT_COUNT] {
            slot.header.decompressed_size = self.decompressed_size;
            slot.data.normal_offset = self.offsets.normal;
            slot.data.uv_offset = self.offsets.uv;
            slot.data.color_offset = self.offsets.color;
            slot.data.faces_offset = self.offsets.faces;
            slot.layout.compression_type = COMPRESSION_KRAKEN;
            slot.layout.decompressed_size = self.decompressed_size;
            slot.layout.compressed_size = self.compressed_size;
        }
        recompute_cumulative_sizes(&mut model.stream_slots);

        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_strict, encode};
    use crate::header::LwoHeader;
    use crate::mesh::{LOD_SIGNATURE, LwoMesh};
    use crate::stream::{LIGHTMAP_OFFSET_COUNT, LightmapStream, StreamDiskLayout};
    use glam::{Vec2, Vec3};
    use pretty_assertions::assert_eq;

    fn packed(vertices: usize, faces: usize) -> PackedGeometry {
        PackedGeometry {
            vertices: vec![[0, 0, 0]; vertices],
            normals: vec![[128, 128, 255]; vertices],
            uvs: vec![[0, 0]; vertices],
            colors: vec![[153, 153, 153, 255]; vertices],
            faces: vec![[0, 1, 2]; faces],
        }
    }

    fn bounds() -> GeometryBounds {
        GeometryBounds {
            min: Vec3::new(-1.0, -2.0, -3.0),
            max: Vec3::new(1.0, 2.0, 3.0),
            scale: 6.0,
            min_uv: Vec2::new(0.0, 0.25),
        }
    }

    fn extended_source() -> LwoModel {
        let mut model = LwoModel {
            header: LwoHeader {
                num_meshes: 2,
                ..Default::default()
            },
            layout: LodLayout::Extended,
            meshes: vec![
                LwoMesh {
                    material: "models/old/first".into(),
                    lods: vec![LodRecord {
                        unk_floats: [1.0, 2.0, 3.0],
                        signature: LOD_SIGNATURE,
                        ..Default::default()
                    }],
                    ..Default::default()
                },
                LwoMesh {
                    material: "models/old/second".into(),
                    lods: vec![LodRecord::default()],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        model.settings2.compress_vertex_streams = 1;
        model.settings2.use_multi_layer = 1;
        model.settings2.render_bump = 0;
        for slot in &mut model.stream_slots {
            slot.header.version = 124;
            slot.header.num_offsets = LIGHTMAP_OFFSET_COUNT;
            slot.data.lightmap = Some(LightmapStream::default());
            slot.data.unk_normal = 40;
        }
        // a native tail describing streams of its own
        model.stream_slots[3].layout.compressed_size = 500;
        model.stream_slots[3].layout.decompressed_size = 900;
        model.stream_slots[3].layout.compression_type = 2;
        model.stream_slots[4].header.decompressed_size = 900;
        model
    }

    #[test]
    fn test_cumulative_sizes() {
        let mut slots = [StreamSlot::default(); 5];
        for (slot, size) in slots.iter_mut().zip([10, 20, 30, 40, 50]) {
            slot.layout.compressed_size = size;
        }
        recompute_cumulative_sizes(&mut slots);
        let cumulative: Vec<u32> = slots
            .iter()
            .map(|s| s.layout.cumulative_compressed_size)
            .collect();
        assert_eq!(cumulative, vec![0, 10, 30, 60, 100]);
    }

    #[test]
    fn test_rewrite_collapses_to_one_mesh() {
        let source = extended_source();
        let rewritten = HeaderRewrite::new("models/new/crate", &packed(4, 2), bounds())
            .compressed_size(30)
            .apply(&source)
            .unwrap();

        assert_eq!(rewritten.header.num_meshes, 1);
        assert_eq!(rewritten.meshes.len(), 1);
        assert_eq!(rewritten.meshes[0].material, "models/new/crate");
        assert_eq!(rewritten.layout, LodLayout::Standard);

        // the source is not modified
        assert_eq!(source.meshes.len(), 2);
        assert_eq!(source.layout, LodLayout::Extended);
    }

    #[test]
    fn test_rewrite_synthesizes_lods() {
        let rewritten = HeaderRewrite::new("m", &packed(4, 2), bounds())
            .apply(&extended_source())
            .unwrap();
        let lods = &rewritten.meshes[0].lods;
        assert_eq!(lods.len(), 3);
        for lod in lods {
            assert_eq!(lod.unk_floats, [1.0, 2.0, 3.0]);
            assert_eq!(lod.signature, LOD_SIGNATURE);
            assert_eq!(lod.num_vertices, 4);
            assert_eq!(lod.num_faces_x3, 6);
            assert_eq!(lod.neg_bounds, [-1.0, -2.0, -3.0]);
            assert_eq!(lod.pos_bounds, [1.0, 2.0, 3.0]);
            assert_eq!(lod.vertex_offset, [-1.0, -2.0, -3.0]);
            assert_eq!(lod.uv_offset, [0.0, 0.25]);
            assert_eq!(lod.vertex_scale, 6.0);
            assert_eq!(lod.uv_scale, 1.0);
            assert_eq!((lod.version, lod.version2), (60, 2));
        }
    }

    #[test]
    fn test_rewrite_normalizes_streams() {
        let geometry = packed(4, 2);
        let rewritten = HeaderRewrite::new("m", &geometry, bounds())
            .compressed_size(30)
            .apply(&extended_source())
            .unwrap();

        assert_eq!(
            rewritten.settings2,
            LwoSettings2 {
                compress_vertex_streams: 0,
                use_multi_layer: 0,
                ..Default::default()
            }
        );

        let size = geometry.byte_len() as u32;
        for (i, slot) in rewritten.stream_slots.iter().enumerate() {
            assert_eq!(slot.header.version, 60);
            assert_eq!(slot.header.num_offsets, 4);
            assert_eq!(slot.data.lightmap, None);
            assert_eq!(slot.data.unk_normal, 32);
            if i < 3 {
                assert_eq!(slot.header.decompressed_size, size);
                assert_eq!(slot.data.normal_offset, 32);
                assert_eq!(slot.data.uv_offset, 64);
                assert_eq!(slot.data.color_offset, 80);
                assert_eq!(slot.data.faces_offset, 96);
                assert_eq!(slot.layout.compression_type, COMPRESSION_KRAKEN);
                assert_eq!(slot.layout.compressed_size, 30);
            } else {
                assert_eq!(slot.header.decompressed_size, 0);
                assert_eq!(
                    slot.layout,
                    StreamDiskLayout {
                        cumulative_compressed_size: 90,
                        ..Default::default()
                    }
                );
            }
        }

        let cumulative: Vec<u32> = rewritten
            .stream_slots
            .iter()
            .map(|s| s.layout.cumulative_compressed_size)
            .collect();
        assert_eq!(cumulative, vec![0, 30, 60, 90, 90]);
    }

    #[test]
    fn test_rewrite_of_extended_source_reads_back() {
        let source = extended_source();
        assert_eq!(source.header.layout(), LodLayout::Extended);

        let rewritten = HeaderRewrite::new("models/new/crate", &packed(4, 2), bounds())
            .compressed_size(30)
            .apply(&source)
            .unwrap();
        assert_eq!(rewritten.header.selector_hash, STANDARD_SELECTOR);

        let reread = decode_strict(&encode(&rewritten).unwrap()).unwrap();
        assert_eq!(reread.layout, LodLayout::Standard);
        assert_eq!(reread.meshes[0].lods.len(), 3);
        assert_eq!(reread.material_names(), vec!["models/new/crate"]);
        assert_eq!(reread.stream_slots, rewritten.stream_slots);
    }

    #[test]
    fn test_rewrite_keeps_standard_selector() {
        let mut source = extended_source();
        source.header.selector_hash = 0xABCD;
        source.layout = LodLayout::Standard;
        for mesh in &mut source.meshes {
            mesh.lods = vec![LodRecord::default(); 3];
        }

        let rewritten = HeaderRewrite::new("m", &packed(3, 1), bounds())
            .apply(&source)
            .unwrap();
        assert_eq!(rewritten.header.selector_hash, 0xABCD);
    }

    #[test]
    fn test_rewrite_rejects_long_material() {
        let err = HeaderRewrite::new("x".repeat(2000), &packed(3, 1), bounds())
            .apply(&extended_source())
            .unwrap_err();
        assert!(matches!(
            err,
            LwoError::InvalidMaterialLength { length: 2000, .. }
        ));
    }

    #[test]
    fn test_rewrite_needs_a_mesh() {
        let err = HeaderRewrite::new("m", &packed(3, 1), bounds())
            .apply(&LwoModel::default())
            .unwrap_err();
        assert!(matches!(err, LwoError::NoMeshes));
    }
}
