// src/commands/control.rs

//! Control file preview

use super::load;
use anyhow::{Result, bail};
use debforge::deb::control;
use debforge::{Affinity, BuildConfig};

/// Print the control file one instance would get
pub fn cmd_control(descriptor: &str, subpackage: Option<&str>, machine: Option<&str>) -> Result<()> {
    let (descriptor, dist) = load(descriptor)?;

    let affinity = match subpackage {
        Some(name) => match dist.subpackage(name) {
            Some(affinity) => affinity,
            None => bail!("{} has no subpackage named '{}'", dist.product, name),
        },
        None => Affinity::Main,
    };

    let mut config = descriptor.build.apply(BuildConfig::new("."));
    if let Some(machine) = machine {
        config = config.with_machine(machine);
    }
    let names = config.instance_names(&dist, affinity);

    print!(
        "{}",
        control::render(&dist, &dist.partition(affinity), &names.package, &config.control_arch())
    );
    Ok(())
}
