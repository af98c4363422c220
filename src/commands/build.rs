// src/commands/build.rs

//! Distribution building and staging

use super::{build_config, load};
use crate::cli::TargetArgs;
use anyhow::{Context, Result};
use debforge::DebBuilder;
use tracing::info;

/// Build every instance of a distribution
pub fn cmd_build(target: &TargetArgs) -> Result<()> {
    let (descriptor, dist) = load(&target.descriptor)?;
    let config = build_config(&descriptor, target);
    info!("Building {} {} into {}", dist.product, dist.full_version(), config.destination.display());

    let report = DebBuilder::new(config)
        .build(&dist)
        .with_context(|| format!("Failed to build {}", dist.product))?;

    for instance in &report.instances {
        if report.archives_removed {
            println!("Built {}", instance.package);
        } else {
            println!("Created: {}", instance.archive.display());
        }
    }
    if let Some(bundle) = &report.bundle {
        println!("Created: {}", bundle.display());
    }
    Ok(())
}

/// Write the staging trees without archiving them
pub fn cmd_stage(target: &TargetArgs) -> Result<()> {
    let (descriptor, dist) = load(&target.descriptor)?;
    let config = build_config(&descriptor, target);

    let staged = DebBuilder::new(config)
        .stage(&dist)
        .with_context(|| format!("Failed to stage {}", dist.product))?;

    for instance in &staged {
        println!("Staged: {}", instance.root.display());
        for script in &instance.scripts {
            println!("  DEBIAN/{}", script);
        }
        if let Some(size) = instance.installed_size {
            println!("  Installed-Size: {}", size);
        }
    }
    Ok(())
}
