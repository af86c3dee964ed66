//! Vertex reindexing
//!
//! OBJ faces index positions, texture coordinates and normals separately.
//! The game wants one index per vertex, so every distinct `p/t/n` corner has
//! to become its own vertex before packing. [`Reindexer`] is that step;
//! [`TobjReindexer`] implements it with the `tobj` loader.

use crate::error::{ObjError, Result};
use std::collections::HashMap;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Decimal places used when writing reindexed coordinates
pub const DEFAULT_PRECISION: usize = 8;

/// Turns an OBJ file into one with a single index per vertex
pub trait Reindexer {
    /// Read `input`, write the reindexed mesh to `obj_out` and its materials
    /// to `mtl_out`, with `precision` decimal places
    fn reindex(&self, input: &Path, obj_out: &Path, mtl_out: &Path, precision: usize)
    -> Result<()>;
}

/// [`Reindexer`] backed by `tobj`'s single-index loader
///
/// Polygons are triangulated; points and lines are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TobjReindexer;

impl TobjReindexer {
    fn load_options() -> tobj::LoadOptions {
        tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ignore_points: true,
            ignore_lines: true,
        }
    }
}

impl Reindexer for TobjReindexer {
    fn reindex(
        &self,
        input: &Path,
        obj_out: &Path,
        mtl_out: &Path,
        precision: usize,
    ) -> Result<()> {
        let source = std::fs::read(input)?;
        let mut reader = std::io::Cursor::new(source.as_slice());
        let (models, _) = tobj::load_obj_buf(&mut reader, &Self::load_options(), |_| {
            Ok((Vec::new(), HashMap::new()))
        })
        .map_err(|e| ObjError::Reindex(format!("{}: {e}", input.display())))?;

        // Material assignments are not carried over; the library only keeps
        // the names so the output stays loadable.
        let material_names = material_names(&source);

        let mtl_name = mtl_out
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut obj = BufWriter::new(std::fs::File::create(obj_out)?);
        write_obj(&mut obj, &models, &mtl_name, precision)?;
        obj.flush()?;

        let mut mtl = BufWriter::new(std::fs::File::create(mtl_out)?);
        for name in &material_names {
            writeln!(mtl, "newmtl {name}")?;
            writeln!(mtl)?;
        }
        mtl.flush()?;

        log::debug!(
            "Reindexed {} into {} model(s), {} vertices",
            input.display(),
            models.len(),
            models.iter().map(|m| m.mesh.positions.len() / 3).sum::<usize>()
        );
        Ok(())
    }
}

/// `usemtl` names in first-use order
fn material_names(source: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(source);
    let mut names: Vec<String> = Vec::new();
    for line in text.lines() {
        if let Some(name) = line.trim().strip_prefix("usemtl ") {
            let name = name.trim();
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Write `models` as OBJ text with one shared index per corner
fn write_obj<W: Write>(
    out: &mut W,
    models: &[tobj::Model],
    mtl_name: &str,
    precision: usize,
) -> std::io::Result<()> {
    if !mtl_name.is_empty() {
        writeln!(out, "mtllib {mtl_name}")?;
    }

    let mut base = 1usize;
    for model in models {
        let mesh = &model.mesh;
        let vertex_count = mesh.positions.len() / 3;
        let has_uv = mesh.texcoords.len() / 2 == vertex_count && vertex_count > 0;
        let has_normal = mesh.normals.len() / 3 == vertex_count && vertex_count > 0;

        writeln!(out, "o {}", model.name)?;
        for p in mesh.positions.chunks_exact(3) {
            writeln!(
                out,
                "v {:.*} {:.*} {:.*}",
                precision, p[0], precision, p[1], precision, p[2]
            )?;
        }
        if has_uv {
            for t in mesh.texcoords.chunks_exact(2) {
                writeln!(out, "vt {:.*} {:.*}", precision, t[0], precision, t[1])?;
            }
        }
        if has_normal {
            for n in mesh.normals.chunks_exact(3) {
                writeln!(
                    out,
                    "vn {:.*} {:.*} {:.*}",
                    precision, n[0], precision, n[1], precision, n[2]
                )?;
            }
        }

        for tri in mesh.indices.chunks_exact(3) {
            write!(out, "f")?;
            for &index in tri {
                let i = base + index as usize;
                match (has_uv, has_normal) {
                    (true, true) => write!(out, " {i}/{i}/{i}")?,
                    (true, false) => write!(out, " {i}/{i}")?,
                    (false, true) => write!(out, " {i}//{i}")?,
                    (false, false) => write!(out, " {i}")?,
                }
            }
            writeln!(out)?;
        }

        base += vertex_count;
    }

    Ok(())
}
