//! Decoding and encoding of LWO headers
//!
//! Real headers are often cut short after the settings block, and some carry
//! garbage in the tail. [`decode`] therefore never fails outright: it returns
//! whatever it could read together with a [`DecodeStatus`], and callers pick
//! their own policy through [`decode_strict`] or [`decode_lenient`].

use crate::error::{LwoError, Result};
use crate::header::{HEADER_SIZE, LwoHeader};
use crate::mesh::LwoMesh;
use crate::model::LwoModel;
use crate::settings::{LwoSettings, LwoSettings2};
use crate::stream::StreamSlot;
use byteorder::{LittleEndian, ReadBytesExt};
use std::fmt;
use std::io::{Cursor, Read};

/// Part of the header after the mesh records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Settings block
    Settings,
    /// Unknown section announced by a non-zero settings file id
    Extension,
    /// 32-byte chunk list
    Chunks,
    /// Mesh name string
    MeshName,
    /// Byte flags
    Settings2,
    /// The five stream slots
    StreamSlots,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Section::Settings => "settings",
            Section::Extension => "extension",
            Section::Chunks => "chunk list",
            Section::MeshName => "mesh name",
            Section::Settings2 => "settings2",
            Section::StreamSlots => "stream slot",
        })
    }
}

/// Why a blob was not accepted as an LWO header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Fewer bytes than the fixed header
    TruncatedHeader,
    /// The final header word is not zero
    NonZeroPadding(u32),
    /// The header declares no meshes
    NoMeshes,
    /// A mesh declares a material longer than allowed
    InvalidMaterialLength {
        /// Mesh number
        mesh: usize,
        /// Declared length
        length: usize,
    },
    /// A mesh record runs past the end of the data
    TruncatedMesh {
        /// Mesh number
        mesh: usize,
    },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::TruncatedHeader => {
                write!(f, "shorter than the {HEADER_SIZE} byte header")
            }
            RejectReason::NonZeroPadding(value) => {
                write!(f, "header padding is {value:#010x}")
            }
            RejectReason::NoMeshes => f.write_str("no meshes"),
            RejectReason::InvalidMaterialLength { mesh, length } => {
                write!(f, "mesh {mesh} declares a {length} byte material")
            }
            RejectReason::TruncatedMesh { mesh } => write!(f, "mesh {mesh} is truncated"),
        }
    }
}

/// How far decoding got
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// Every section was read
    Complete,
    /// Meshes were read; this section and everything after it hold defaults
    Partial(Section),
    /// Not a usable header; the model holds only what preceded the failure
    Rejected(RejectReason),
}

/// Result of [`decode`]
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// Decoded fields, defaults where decoding stopped
    pub model: LwoModel,
    /// How far decoding got
    pub status: DecodeStatus,
}

impl Decoded {
    /// Whether the model is usable as a rewrite source
    pub fn is_usable(&self) -> bool {
        !matches!(self.status, DecodeStatus::Rejected(_))
    }
}

/// Decode a header blob
pub fn decode(bytes: &[u8]) -> Decoded {
    let mut cursor = Cursor::new(bytes);
    let mut model = LwoModel::default();

    let rejected = |model: LwoModel, reason: RejectReason| {
        log::debug!("LWO header rejected: {reason}");
        Decoded {
            model,
            status: DecodeStatus::Rejected(reason),
        }
    };

    let Ok(header) = LwoHeader::read(&mut cursor) else {
        return rejected(model, RejectReason::TruncatedHeader);
    };
    model.header = header;
    model.layout = header.layout();
    if header.null_pad32_2 != 0 {
        return rejected(model, RejectReason::NonZeroPadding(header.null_pad32_2));
    }
    if header.num_meshes == 0 {
        return rejected(model, RejectReason::NoMeshes);
    }

    log::debug!(
        "LWO header: {} mesh(es), {} layout",
        header.num_meshes,
        model.layout
    );

    for mesh in 0..header.num_meshes as usize {
        match LwoMesh::read(&mut cursor, model.layout) {
            Ok(record) => model.meshes.push(record),
            Err(LwoError::InvalidMaterialLength { length, .. }) => {
                return rejected(
                    model,
                    RejectReason::InvalidMaterialLength { mesh, length },
                );
            }
            Err(_) => return rejected(model, RejectReason::TruncatedMesh { mesh }),
        }
    }

    let status = match read_tail(&mut cursor, &mut model) {
        Ok(()) => {
            let trailing = bytes.len() as u64 - cursor.position();
            if trailing > 0 {
                log::debug!("{trailing} bytes after the last stream slot");
            }
            DecodeStatus::Complete
        }
        Err(section) => {
            log::debug!("LWO header ends before the {section} section");
            DecodeStatus::Partial(section)
        }
    };

    Decoded { model, status }
}

fn remaining(cursor: &Cursor<&[u8]>) -> u64 {
    (cursor.get_ref().len() as u64).saturating_sub(cursor.position())
}

/// Read everything after the meshes, stopping at the first section that fails
fn read_tail(
    cursor: &mut Cursor<&[u8]>,
    model: &mut LwoModel,
) -> std::result::Result<(), Section> {
    model.settings = LwoSettings::read(cursor).map_err(|_| Section::Settings)?;
    if model.settings.unk_file_id != 0 {
        // layout of the section that follows is unknown
        return Err(Section::Extension);
    }

    let count = cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| Section::Chunks)?;
    if u64::from(count) * 32 > remaining(&*cursor) {
        return Err(Section::Chunks);
    }
    let mut chunks = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mut chunk = [0.0f32; 8];
        cursor
            .read_f32_into::<LittleEndian>(&mut chunk)
            .map_err(|_| Section::Chunks)?;
        chunks.push(chunk);
    }
    model.chunks = chunks;

    let name_len = cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| Section::MeshName)?;
    if u64::from(name_len) > remaining(&*cursor) {
        return Err(Section::MeshName);
    }
    let mut name = vec![0u8; name_len as usize];
    cursor.read_exact(&mut name).map_err(|_| Section::MeshName)?;
    model.mesh_name = String::from_utf8_lossy(&name).into_owned();

    model.settings2 = LwoSettings2::read(cursor).map_err(|_| Section::Settings2)?;

    let mut slots = [StreamSlot::default(); crate::stream::STREAM_SLOT_COUNT];
    for (index, slot) in slots.iter_mut().enumerate() {
        *slot = StreamSlot::read(cursor, index).map_err(|_| Section::StreamSlots)?;
    }

    // slots are taken all together or not at all
    model.stream_slots = slots;
    Ok(())
}

/// Decode, failing on anything short of a complete header
pub fn decode_strict(bytes: &[u8]) -> Result<LwoModel> {
    let decoded = decode(bytes);
    match decoded.status {
        DecodeStatus::Complete => Ok(decoded.model),
        DecodeStatus::Partial(section) => Err(LwoError::Incomplete(section)),
        DecodeStatus::Rejected(reason) => Err(LwoError::Rejected(reason)),
    }
}

/// Decode, accepting headers that stop after the meshes
pub fn decode_lenient(bytes: &[u8]) -> Result<LwoModel> {
    let decoded = decode(bytes);
    match decoded.status {
        DecodeStatus::Complete => Ok(decoded.model),
        DecodeStatus::Partial(section) => {
            log::warn!("LWO header incomplete from the {section} section on, using defaults");
            Ok(decoded.model)
        }
        DecodeStatus::Rejected(reason) => Err(LwoError::Rejected(reason)),
    }
}

/// Encode a model; see [`LwoModel::write`]
pub fn encode(model: &LwoModel) -> Result<Vec<u8>> {
    model.to_bytes()
}
