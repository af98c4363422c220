// src/deb/size.rs

//! Installed-Size field
//!
//! The size of the staged tree is measured with `du` and appended to the
//! control file.

use crate::error::{Error, Result};
use crate::filesystem;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Measures the disk usage of a directory in KiB
pub trait SizeProbe {
    fn measure(&self, dir: &Path) -> Result<u64>;
}

/// `du -k -s <dir>`
#[derive(Debug, Clone, Default)]
pub struct DuProbe;

impl SizeProbe for DuProbe {
    fn measure(&self, dir: &Path) -> Result<u64> {
        let output = Command::new("du")
            .arg("-k")
            .arg("-s")
            .arg(dir)
            .output()
            .map_err(|e| Error::CommandError(format!("Failed to run du: {}", e)))?;

        if !output.status.success() {
            return Err(Error::CommandError(format!(
                "du failed on {}: {}",
                dir.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_du_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse the leading size token of `du -s` output
pub fn parse_du_output(output: &str) -> Result<u64> {
    let token = output
        .split_whitespace()
        .next()
        .ok_or_else(|| Error::ParseError("du produced no output".to_string()))?;

    token
        .parse()
        .map_err(|_| Error::ParseError(format!("unexpected du output: '{}'", token)))
}

/// Measure `staged_dir` and append `Installed-Size` to `control`
///
/// Nothing is appended when the probe fails.
pub fn append_installed_size(control: &Path, staged_dir: &Path, probe: &dyn SizeProbe) -> Result<u64> {
    let size = probe.measure(staged_dir)?;
    debug!("Installed-Size of {} is {} KiB", staged_dir.display(), size);
    filesystem::append_text(control, "control file", &format!("Installed-Size: {}\n", size))?;
    Ok(size)
}
