// src/main.rs

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

/// Log level selected by the number of `-v` flags
fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build { target } => commands::cmd_build(&target),
        Commands::Stage { target } => commands::cmd_stage(&target),
        Commands::Control {
            descriptor,
            subpackage,
            machine,
        } => commands::cmd_control(&descriptor, subpackage.as_deref(), machine.as_deref()),
        Commands::Completions { shell } => commands::cmd_completions(shell),
    }
}
