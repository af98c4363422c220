// src/commands/mod.rs
//! Command handlers for the debforge CLI

mod build;
mod completions;
mod control;

pub use build::{cmd_build, cmd_stage};
pub use completions::cmd_completions;
pub use control::cmd_control;

use crate::cli::TargetArgs;
use anyhow::{Context, Result};
use debforge::{BuildConfig, Descriptor, Distribution, ProductMode};
use std::path::Path;

/// Load a descriptor and convert it into a distribution
fn load(path: &str) -> Result<(Descriptor, Distribution)> {
    let descriptor = Descriptor::from_file(Path::new(path))
        .with_context(|| format!("Failed to load descriptor {}", path))?;
    let dist = descriptor
        .to_distribution()
        .with_context(|| format!("Invalid distribution in {}", path))?;
    Ok((descriptor, dist))
}

/// Descriptor `[build]` defaults, overridden by command-line flags
fn build_config(descriptor: &Descriptor, target: &TargetArgs) -> BuildConfig {
    let mut config = descriptor.build.apply(BuildConfig::new(&target.output));
    if let Some(platform) = &target.platform {
        config = config.with_platform(platform);
    }
    if let Some(machine) = &target.machine {
        config = config.with_machine(machine);
    }
    if target.alternate {
        config = config.with_mode(ProductMode::Alternate);
    }
    if target.keep_files {
        config = config.keep_files(true);
    }
    config
}
