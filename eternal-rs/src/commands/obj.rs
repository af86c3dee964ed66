//! OBJ command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use eternal_obj::ObjDocument;
use std::path::{Path, PathBuf};

use crate::converter::{ConvertError, ModelConverter};
use crate::utils::{add_table_row, create_table};

#[derive(Subcommand)]
pub enum ObjCommands {
    /// Show the object groups of an OBJ file and whether it can be converted
    Info {
        /// Path to the OBJ file
        file: PathBuf,
    },
}

pub fn execute(command: ObjCommands) -> Result<()> {
    match command {
        ObjCommands::Info { file } => show_info(&file),
    }
}

fn show_info(path: &Path) -> Result<()> {
    let doc = ObjDocument::from_path(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    println!("OBJ File Information");
    println!("====================");
    println!("Path: {}", path.display());
    println!("Retained lines: {}", doc.lines().len());
    println!();

    let mut table = create_table(vec!["Object", "Vertices", "UVs", "Normals", "Faces", "Material"]);
    for group in doc.groups() {
        let material = group
            .material_line
            .as_deref()
            .and_then(|l| l.split_whitespace().nth(1))
            .unwrap_or("-");
        add_table_row(
            &mut table,
            vec![
                group.name.clone(),
                group.vertices.len().to_string(),
                group.uvs.len().to_string(),
                group.normals.len().to_string(),
                group.faces.len().to_string(),
                material.to_string(),
            ],
        );
    }
    table.printstd();
    println!();

    match ModelConverter::default().try_inspect_obj(path) {
        Ok(names) if names.len() > 1 => {
            println!(
                "Convertible: no ({} objects; merge them into one first)",
                names.len()
            );
        }
        Ok(_) => println!("Convertible: yes"),
        Err(ConvertError::Format { detail, .. }) => println!("Convertible: no ({detail})"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
