//! Eternal-RS library
//!
//! Converts Wavefront OBJ models into DOOM Eternal `.lwo` imports and browses
//! the game's `.resources` archives. [`converter::ModelConverter`] is the
//! entry point for programmatic use; the `eternal-rs` binary wraps it.

pub mod cli;
pub mod commands;
pub mod converter;
pub mod utils;

pub use converter::{
    ConversionReport, ConversionRequest, ConvertError, ConverterOptions, ImportLayout,
    ModelConverter,
};
