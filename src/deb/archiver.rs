// src/deb/archiver.rs

//! `dpkg --build` invocation

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Turns a staged instance directory into an archive
pub trait Archiver {
    /// Build `<workdir>/<instance_dir>` and return the archive path
    fn build(&self, workdir: &Path, instance_dir: &str) -> Result<PathBuf>;
}

/// Runs `dpkg --build`, optionally under `fakeroot`
#[derive(Debug, Clone)]
pub struct DpkgArchiver {
    fakeroot: bool,
}

impl DpkgArchiver {
    /// Use `fakeroot` when not running as root and it is installed
    pub fn detect() -> Self {
        let fakeroot = !nix::unistd::geteuid().is_root() && which::which("fakeroot").is_ok();
        debug!("dpkg will run {} fakeroot", if fakeroot { "under" } else { "without" });
        Self { fakeroot }
    }

    pub fn with_fakeroot(fakeroot: bool) -> Self {
        Self { fakeroot }
    }

    pub fn uses_fakeroot(&self) -> bool {
        self.fakeroot
    }

    /// Program and arguments for one build
    pub fn command_line(&self, instance_dir: &str) -> Vec<String> {
        let mut argv = Vec::with_capacity(4);
        if self.fakeroot {
            argv.push("fakeroot".to_string());
        }
        argv.push("dpkg".to_string());
        argv.push("--build".to_string());
        argv.push(instance_dir.to_string());
        argv
    }
}

impl Archiver for DpkgArchiver {
    fn build(&self, workdir: &Path, instance_dir: &str) -> Result<PathBuf> {
        let argv = self.command_line(instance_dir);
        info!("Running {} in {}", argv.join(" "), workdir.display());

        let output = Command::new(&argv[0])
            .args(&argv[1..])
            .current_dir(workdir)
            .output()
            .map_err(|e| Error::CommandError(format!("Failed to run {}: {}", argv[0], e)))?;

        if !output.status.success() {
            return Err(Error::CommandError(format!(
                "{} exited with {:?}: {}",
                argv.join(" "),
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(workdir.join(format!("{}.deb", instance_dir)))
    }
}
