//! Command-line interface definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "eternal-rs")]
#[command(about = "DOOM Eternal model converter and resource browser", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the Oodle runtime (located next to the game when omitted)
    #[arg(long, global = true, env = "ETERNAL_OODLE_PATH")]
    pub oodle: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// .resources archive operations
    Resources {
        #[command(subcommand)]
        command: crate::commands::resources::ResourcesCommands,
    },

    /// Wavefront OBJ operations
    Obj {
        #[command(subcommand)]
        command: crate::commands::obj::ObjCommands,
    },

    /// LWO model header operations
    Lwo {
        #[command(subcommand)]
        command: crate::commands::lwo::LwoCommands,
    },

    /// Convert an OBJ model into an import replacing an archive model
    Convert(crate::commands::convert::ConvertArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
