//! Resources archive command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use eternal_resources::{ResourceArchive, ResourceEntry};
use std::fs;
use std::path::{Path, PathBuf};

use crate::commands::open_codec;
use crate::utils::{
    add_table_row, create_spinner, create_table, extraction_path, format_bytes,
    format_compression_ratio, format_hash, truncate_path,
};

#[derive(Subcommand)]
pub enum ResourcesCommands {
    /// List entries in a .resources archive
    List {
        /// Path to the .resources archive
        archive: PathBuf,

        /// Only list entries whose path contains every space-separated term
        #[arg(short, long)]
        search: Option<String>,

        /// Only list models the converter can replace
        #[arg(short, long)]
        models: bool,

        /// Show detailed information (type, size, hash)
        #[arg(short, long)]
        long: bool,
    },

    /// Extract entries from a .resources archive
    Extract {
        /// Path to the .resources archive
        archive: PathBuf,

        /// Entries to extract
        #[arg(required = true)]
        entries: Vec<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Preserve directory structure
        #[arg(short, long)]
        preserve_paths: bool,
    },

    /// Show information about a .resources archive
    Info {
        /// Path to the .resources archive
        archive: PathBuf,
    },
}

pub fn execute(command: ResourcesCommands, oodle: Option<&Path>) -> Result<()> {
    match command {
        ResourcesCommands::List {
            archive,
            search,
            models,
            long,
        } => list_archive(&archive, search.as_deref(), models, long),
        ResourcesCommands::Extract {
            archive,
            entries,
            output,
            preserve_paths,
        } => extract_entries(&archive, &entries, &output, preserve_paths, oodle),
        ResourcesCommands::Info { archive } => show_info(&archive),
    }
}

fn open_archive(path: &Path) -> Result<ResourceArchive> {
    let spinner = create_spinner("Opening archive...");
    let archive = ResourceArchive::open(path).context("Failed to open archive");
    spinner.finish_and_clear();
    archive
}

fn list_archive(path: &Path, search: Option<&str>, models: bool, long: bool) -> Result<()> {
    let archive = open_archive(path)?;

    let mut entries: Vec<&ResourceEntry> = match search {
        Some(query) => archive.search(query),
        None => archive.entries().iter().collect(),
    };
    if models {
        entries.retain(|e| e.is_convertible_model());
    }

    if entries.is_empty() {
        println!("No entries found");
        return Ok(());
    }

    if long {
        let mut table = create_table(vec!["Entry", "Type", "Size", "Compressed", "Ratio", "Hash"]);
        for entry in &entries {
            add_table_row(
                &mut table,
                vec![
                    truncate_path(&entry.name, 60),
                    entry.type_tag.clone(),
                    format_bytes(entry.uncompressed_size),
                    format_bytes(entry.compressed_size),
                    format_compression_ratio(entry.uncompressed_size, entry.compressed_size),
                    format_hash(entry.hash),
                ],
            );
        }
        table.printstd();
    } else {
        for entry in &entries {
            println!("{}", entry.name);
        }
    }

    Ok(())
}

fn extract_entries(
    archive_path: &Path,
    names: &[String],
    output_dir: &Path,
    preserve_paths: bool,
    oodle: Option<&Path>,
) -> Result<()> {
    let archive = open_archive(archive_path)?;
    let codec = open_codec(oodle, archive_path)?;

    let mut failed = 0usize;
    for name in names {
        match archive.read_entry_by_name(name, codec.as_deref()) {
            Ok(data) => {
                let output_path = extraction_path(output_dir, name, preserve_paths);
                if let Some(parent) = output_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&output_path, &data)
                    .with_context(|| format!("Failed to write {}", output_path.display()))?;
                println!("{} -> {}", name, output_path.display());
            }
            Err(e) => {
                log::warn!("Failed to extract {name}: {e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} entries could not be extracted", names.len());
    }
    Ok(())
}

fn show_info(path: &Path) -> Result<()> {
    let archive = open_archive(path)?;
    let header = archive.header();
    let entries = archive.entries();

    let stored: u64 = entries.iter().map(|e| e.compressed_size).sum();
    let unpacked: u64 = entries.iter().map(|e| e.uncompressed_size).sum();
    let compressed = entries.iter().filter(|e| e.is_compressed()).count();
    let models = entries.iter().filter(|e| e.is_model()).count();
    let convertible = entries.iter().filter(|e| e.is_convertible_model()).count();

    println!("Resources Archive Information");
    println!("=============================");
    println!("Path: {}", path.display());
    println!("Format version: {}", header.version);
    println!("Archive size: {}", format_bytes(fs::metadata(path)?.len()));
    println!("Number of entries: {}", entries.len());
    println!("Compressed entries: {compressed}");
    println!("Models: {models} ({convertible} convertible)");
    println!("Dependencies: {}", header.num_dependencies);
    println!("String table: {}", format_bytes(u64::from(header.string_table_size)));
    println!(
        "Data: {} stored, {} unpacked ({} saved)",
        format_bytes(stored),
        format_bytes(unpacked),
        format_compression_ratio(unpacked, stored)
    );

    Ok(())
}
