//! Convert command implementation

use anyhow::{Context, Result, bail};
use clap::Args;
use console::style;
use eternal_resources::Oodle;
use std::path::{Path, PathBuf};

use crate::converter::{
    ConversionRequest, ConvertError, ConverterOptions, GameDirs, ModelConverter,
};
use crate::utils::{create_spinner, format_bytes, format_compression_ratio};

#[derive(Args)]
pub struct ConvertArgs {
    /// OBJ model to convert (a single object)
    pub obj: PathBuf,

    /// Archive holding the model to replace, inside the game's base directory
    pub archive: PathBuf,

    /// Entry path of the model to replace, e.g. models/mapobjects/crate_01.lwo
    pub entry: String,

    /// Material declaration for the converted mesh
    #[arg(short, long)]
    pub material: String,

    /// The OBJ uses Y as its up axis
    #[arg(long)]
    pub y_up: bool,

    /// Directory receiving the import
    #[arg(long, default_value = "imports")]
    pub imports: PathBuf,

    /// Keep the sanitized and reindexed OBJ files
    #[arg(long)]
    pub keep_temp: bool,
}

pub fn execute(args: ConvertArgs, oodle: Option<&Path>) -> Result<()> {
    let dirs = GameDirs::from_archive(&args.archive).with_context(|| {
        format!(
            "{} must be located in the game's \"base\" directory or its subdirectories",
            args.archive.display()
        )
    })?;

    let mut converter = ModelConverter::new(ConverterOptions {
        imports_root: args.imports.clone(),
        keep_temporaries: args.keep_temp,
        ..Default::default()
    });
    if let Some(path) = oodle {
        let codec = Oodle::load(path)
            .with_context(|| format!("Failed to load Oodle from {}", path.display()))?;
        converter = converter.with_codec(Box::new(codec));
    }

    let objects = converter.try_inspect_obj(&args.obj)?;
    if objects.len() > 1 {
        bail!(
            "{} holds {} objects ({}); merge them into one before converting",
            args.obj.display(),
            objects.len(),
            objects.join(", ")
        );
    }

    let replaced = converter.try_inspect_lwo(&args.entry, &args.archive)?;
    log::info!("Replacing materials: {}", replaced.join(", "));

    let request = ConversionRequest {
        game_dir: dirs.game_dir,
        obj_path: args.obj.clone(),
        target_name: args.entry.clone(),
        archive_path: args.archive.clone(),
        material: args.material.clone(),
        y_up: args.y_up,
    };

    let spinner = create_spinner("Converting model...");
    let result = converter.try_convert(&request);
    spinner.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(ConvertError::Capacity { vertex_count }) => bail!(
            "{} needs {vertex_count} vertices after reindexing; DOOM Eternal meshes hold at most 65535",
            args.obj.display()
        ),
        Err(e) => return Err(e.into()),
    };

    println!("{}", style("Conversion complete").bold().green());
    println!("{}", style("===================").green());
    println!("Model: {}", args.obj.display());
    println!("Replaces: {} ({})", args.entry, replaced.join(", "));
    println!("Material: {}", args.material);
    println!("Vertices: {}", report.vertex_count);
    println!("Faces: {}", report.face_count);
    println!(
        "Geometry: {} packed, {} compressed ({} saved)",
        format_bytes(report.decompressed_size as u64),
        format_bytes(report.compressed_size as u64),
        format_compression_ratio(report.decompressed_size as u64, report.compressed_size as u64)
    );
    println!("Stream index: {}", report.stream_index);
    println!("Header: {}", report.header_path.display());
    println!("Payload: {}", report.payload_path.display());

    Ok(())
}
