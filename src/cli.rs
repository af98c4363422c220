// src/cli.rs
//! CLI definitions for debforge
//!
//! The command implementations live in the `commands` module.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "debforge")]
#[command(author = "debforge contributors")]
#[command(version)]
#[command(about = "Build Debian packages from a product distribution", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by the commands that produce package trees
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Path to the distribution descriptor (TOML)
    pub descriptor: String,

    /// Destination directory
    #[arg(short, long, default_value = ".")]
    pub output: String,

    /// Platform used in file names (defaults to the host machine)
    #[arg(long)]
    pub platform: Option<String>,

    /// Machine used for the Architecture field (defaults to the host machine)
    #[arg(long)]
    pub machine: Option<String>,

    /// Alternate product mode: `_` separators, Debian arch names, Installed-Size
    #[arg(long)]
    pub alternate: bool,

    /// Keep staging trees and per-instance archives
    #[arg(long)]
    pub keep_files: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build every package instance and bundle them when needed
    Build {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Write the staging trees without running dpkg
    Stage {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Print the control file of one package instance
    Control {
        /// Path to the distribution descriptor (TOML)
        descriptor: String,

        /// Subpackage to render (main package when omitted)
        #[arg(short, long)]
        subpackage: Option<String>,

        /// Machine used for the Architecture field
        #[arg(long)]
        machine: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
