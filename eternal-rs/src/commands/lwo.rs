//! LWO command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use eternal_lwo::{DecodeStatus, LwoModel, decode};
use eternal_resources::{
    DEFAULT_LOD_ADJUSTMENT, ResourceArchive, StreamDbPayload, streamdb_index,
};
use std::path::{Path, PathBuf};

use crate::commands::open_codec;
use crate::utils::{add_table_row, create_spinner, create_table, format_bytes, format_hash, parse_hash};

#[derive(Subcommand)]
pub enum LwoCommands {
    /// Decode the header of a model stored in a .resources archive
    Info {
        /// Path to the .resources archive
        archive: PathBuf,

        /// Entry path, e.g. models/mapobjects/crate_01.lwo
        entry: String,
    },

    /// Derive the stream index for a resource hash
    StreamIndex {
        /// Resource hash, decimal or 0x-prefixed hex
        #[arg(value_parser = hash_arg)]
        hash: u64,

        /// LOD count adjustment
        #[arg(long, default_value_t = DEFAULT_LOD_ADJUSTMENT, allow_hyphen_values = true)]
        adjust: i32,
    },

    /// Show the framing of a STREAMDB geometry payload
    Payload {
        /// Path to the payload written by `convert`
        file: PathBuf,
    },
}

fn hash_arg(text: &str) -> Result<u64, String> {
    parse_hash(text).ok_or_else(|| format!("invalid hash: {text}"))
}

pub fn execute(command: LwoCommands, oodle: Option<&Path>) -> Result<()> {
    match command {
        LwoCommands::Info { archive, entry } => show_info(&archive, &entry, oodle),
        LwoCommands::StreamIndex { hash, adjust } => {
            show_stream_index(hash, adjust);
            Ok(())
        }
        LwoCommands::Payload { file } => show_payload(&file),
    }
}

fn show_info(archive_path: &Path, name: &str, oodle: Option<&Path>) -> Result<()> {
    let spinner = create_spinner("Opening archive...");
    let archive = ResourceArchive::open(archive_path).context("Failed to open archive");
    spinner.finish_and_clear();
    let archive = archive?;

    let entry = archive
        .find(name)
        .with_context(|| format!("{name} is not in {}", archive_path.display()))?;
    let codec = open_codec(oodle, archive_path)?;
    let bytes = archive
        .read_entry(entry, codec.as_deref())
        .context("Failed to extract LWO header")?;
    let decoded = decode(&bytes);

    println!("LWO Header Information");
    println!("======================");
    println!("Entry: {}", entry.name);
    println!("Resource hash: {}", format_hash(entry.hash));
    println!(
        "Stream index: {}",
        streamdb_index(entry.hash, DEFAULT_LOD_ADJUSTMENT)
    );
    println!("Header size: {}", format_bytes(bytes.len() as u64));
    match &decoded.status {
        DecodeStatus::Complete => println!("Decoded: complete"),
        DecodeStatus::Partial(section) => println!("Decoded: partial (ends before {section})"),
        DecodeStatus::Rejected(reason) => {
            println!("Decoded: rejected ({reason})");
            return Ok(());
        }
    }

    print_model(&decoded.model);
    Ok(())
}

fn print_model(model: &LwoModel) {
    println!("File type: {}", model.header.file_type);
    println!("Layout: {}", model.layout);
    println!("Meshes: {}", model.header.num_meshes);
    println!();

    let mut meshes = create_table(vec!["#", "Material", "LODs", "Vertices", "Faces", "Scale"]);
    for (i, mesh) in model.meshes.iter().enumerate() {
        let (vertices, faces, scale) = mesh.lods.first().map_or(
            (String::new(), String::new(), String::new()),
            |lod| {
                (
                    lod.num_vertices.to_string(),
                    lod.face_count().to_string(),
                    format!("{:.4}", lod.vertex_scale),
                )
            },
        );
        add_table_row(
            &mut meshes,
            vec![
                i.to_string(),
                mesh.material.clone(),
                mesh.lods.len().to_string(),
                vertices,
                faces,
                scale,
            ],
        );
    }
    meshes.printstd();
    println!();

    let mut slots = create_table(vec![
        "Slot",
        "Version",
        "Offsets",
        "Compression",
        "Decompressed",
        "Compressed",
        "Cumulative",
    ]);
    for (i, slot) in model.stream_slots.iter().enumerate() {
        add_table_row(
            &mut slots,
            vec![
                i.to_string(),
                format!("{}/{}", slot.header.version, slot.header.version2),
                slot.header.num_offsets.to_string(),
                slot.layout.compression_type.to_string(),
                slot.layout.decompressed_size.to_string(),
                slot.layout.compressed_size.to_string(),
                slot.layout.cumulative_compressed_size.to_string(),
            ],
        );
    }
    slots.printstd();
}

fn show_stream_index(hash: u64, adjust: i32) {
    println!("Resource hash: {}", format_hash(hash));
    println!("Stream index: {}", streamdb_index(hash, adjust));
}

fn show_payload(path: &Path) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let payload = StreamDbPayload::parse(&bytes).context("Not a STREAMDB payload")?;

    println!("STREAMDB Payload");
    println!("================");
    println!("Path: {}", path.display());
    println!("Compressed data: {}", format_bytes(payload.compressed_len() as u64));

    let mut table = create_table(vec!["LOD", "Offset", "Length"]);
    for (i, lod) in payload.lods.iter().enumerate() {
        add_table_row(
            &mut table,
            vec![i.to_string(), lod.offset.to_string(), lod.length.to_string()],
        );
    }
    table.printstd();
    Ok(())
}
