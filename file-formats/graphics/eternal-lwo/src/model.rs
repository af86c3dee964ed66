//! In-memory LWO header

use crate::error::{LwoError, Result};
use crate::header::{LodLayout, LwoHeader};
use crate::mesh::LwoMesh;
use crate::settings::{LwoSettings, LwoSettings2};
use crate::stream::{STREAM_SLOT_COUNT, StreamSlot};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

/// A decoded LWO header
///
/// The geometry itself lives in the `.streamdb` container; this is the
/// metadata the engine reads from the `.resources` entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LwoModel {
    /// File header
    pub header: LwoHeader,
    /// LOD layout used for every mesh
    pub layout: LodLayout,
    /// Mesh records
    pub meshes: Vec<LwoMesh>,
    /// Settings block
    pub settings: LwoSettings,
    /// Unknown 32-byte chunks after the settings
    pub chunks: Vec<[f32; 8]>,
    /// Optional mesh name after the chunks
    pub mesh_name: String,
    /// Byte flags
    pub settings2: LwoSettings2,
    /// Stream descriptor slots
    pub stream_slots: [StreamSlot; STREAM_SLOT_COUNT],
}

impl LwoModel {
    /// Material declaration of every mesh, in record order
    pub fn material_names(&self) -> Vec<String> {
        self.meshes.iter().map(|m| m.material.clone()).collect()
    }

    /// Write the model the way the engine accepts a replacement header
    ///
    /// Only the first mesh is written and the header's mesh count is set to
    /// one. No 32-byte chunks and no mesh name are written. The header's
    /// selector must pick the model's layout, or the bytes would not read
    /// back.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mesh = self.meshes.first().ok_or(LwoError::NoMeshes)?;
        if self.header.null_pad32_2 != 0 {
            return Err(LwoError::NonZeroPadding(self.header.null_pad32_2));
        }
        let selected = self.header.layout();
        if selected != self.layout {
            return Err(LwoError::LayoutMismatch {
                layout: self.layout.name(),
                selected: selected.name(),
            });
        }
        if self.meshes.len() > 1 {
            log::debug!(
                "Writing first of {} meshes ({})",
                self.meshes.len(),
                mesh.material
            );
        }

        let header = LwoHeader {
            num_meshes: 1,
            ..self.header
        };
        header.write(writer)?;
        mesh.write(writer, self.layout)?;
        self.settings.write(writer)?;

        // chunk count, then mesh name length
        writer.write_u32::<LittleEndian>(0)?;
        writer.write_u32::<LittleEndian>(0)?;

        self.settings2.write(writer)?;
        for (index, slot) in self.stream_slots.iter().enumerate() {
            slot.write(writer, index)?;
        }
        Ok(())
    }

    /// Encode into a new buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        Ok(buf)
    }
}
