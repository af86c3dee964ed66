use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use std::io;

use eternal_rs::cli::{Cli, Commands};
use eternal_rs::commands;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    if cli.verbose > 0 {
        log::set_max_level(match cli.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    } else if cli.quiet {
        log::set_max_level(log::LevelFilter::Error);
    }

    let oodle = cli.oodle;

    match cli.command {
        Commands::Resources { command } => commands::resources::execute(command, oodle.as_deref()),
        Commands::Obj { command } => commands::obj::execute(command),
        Commands::Lwo { command } => commands::lwo::execute(command, oodle.as_deref()),
        Commands::Convert(args) => commands::convert::execute(args, oodle.as_deref()),
        Commands::Completions { shell } => {
            print_completions(shell, &mut Cli::command());
            Ok(())
        }
    }
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(generator, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
