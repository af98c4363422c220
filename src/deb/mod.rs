// src/deb/mod.rs
//! Debian package synthesis
//!
//! Builds one `.deb` per package instance (the main product and each
//! subpackage):
//! - DEBIAN/control, templates, maintainer scripts and conffiles
//! - the file layout under the staging directory
//! - `dpkg --build` on the staged tree
//!
//! When the distribution declares subpackages, every archive is bundled
//! into a single `.deb.tgz`.

pub mod archiver;
pub mod conffiles;
pub mod control;
pub mod layout;
pub mod scripts;
pub mod size;

pub use crate::config::InstanceNames;
pub use archiver::{Archiver, DpkgArchiver};
pub use size::{DuProbe, SizeProbe};

use crate::bundle;
use crate::config::BuildConfig;
use crate::distribution::{Affinity, Distribution};
use crate::error::{Error, Result};
use crate::filesystem::{self, path};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::info;

/// A staged but not yet archived instance
#[derive(Debug, Clone)]
pub struct StagedInstance {
    pub names: InstanceNames,
    /// `<destination>/<directory>`
    pub root: PathBuf,
    /// Templates and script files that were written
    pub scripts: Vec<&'static str>,
    /// Installed-Size value, alternate mode only
    pub installed_size: Option<u64>,
}

/// An archived instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceArtifact {
    pub package: String,
    pub archive: PathBuf,
}

/// Outcome of a distribution build
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub instances: Vec<InstanceArtifact>,
    /// `.deb.tgz` container, when subpackages exist
    pub bundle: Option<PathBuf>,
    /// Whether the per-instance archives were deleted after bundling
    pub archives_removed: bool,
}

/// Debian package builder
pub struct DebBuilder {
    config: BuildConfig,
    archiver: Box<dyn Archiver>,
    probe: Box<dyn SizeProbe>,
}

impl DebBuilder {
    /// Builder using `dpkg` and `du` from the host
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            archiver: Box::new(DpkgArchiver::detect()),
            probe: Box::new(DuProbe),
        }
    }

    /// Replace the archiver
    pub fn with_archiver(mut self, archiver: impl Archiver + 'static) -> Self {
        self.archiver = Box::new(archiver);
        self
    }

    /// Replace the disk-usage probe
    pub fn with_size_probe(mut self, probe: impl SizeProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Package and directory names of one instance
    pub fn instance_names(&self, dist: &Distribution, affinity: Affinity) -> InstanceNames {
        self.config.instance_names(dist, affinity)
    }

    /// Path of the `.deb.tgz` container
    pub fn bundle_path(&self, dist: &Distribution) -> PathBuf {
        self.config.bundle_path(dist)
    }

    /// Write the metadata and file layout of one instance
    pub fn stage_instance(&self, dist: &Distribution, affinity: Affinity) -> Result<StagedInstance> {
        let names = self.instance_names(dist, affinity);
        let view = dist.partition(affinity);
        info!("Creating Debian {} distribution...", names.directory);

        let root = self
            .config
            .destination
            .join(path::sanitize_filename(&names.directory)?);
        let debian_dir = root.join("DEBIAN");
        fs::create_dir_all(&debian_dir)
            .map_err(|e| Error::create("package directory", &debian_dir, e))?;
        fs::set_permissions(&debian_dir, fs::Permissions::from_mode(0o755))?;

        control::write(
            &debian_dir,
            dist,
            &view,
            &names.package,
            &self.config.control_arch(),
        )?;
        let scripts = scripts::write_all(&debian_dir, &view, &self.config.version_stamp)?;
        conffiles::write(&debian_dir, &view)?;

        // Measured before the payload is copied in
        let installed_size = if self.config.mode.adds_installed_size() {
            info!("Calculating Installed-Size...");
            Some(size::append_installed_size(
                &debian_dir.join("control"),
                &root,
                self.probe.as_ref(),
            )?)
        } else {
            None
        };

        info!("Copying temporary distribution files...");
        layout::materialize(&root, &view)?;

        Ok(StagedInstance {
            names,
            root,
            scripts,
            installed_size,
        })
    }

    /// Stage, archive and clean up one instance
    pub fn build_instance(&self, dist: &Distribution, affinity: Affinity) -> Result<InstanceArtifact> {
        let staged = self.stage_instance(dist, affinity)?;

        info!("Building Debian {} binary distribution...", staged.names.directory);
        let archive = self
            .archiver
            .build(&self.config.destination, &staged.names.directory)?;

        if !self.config.keep_files {
            info!("Removing temporary {} distribution files...", staged.names.directory);
            filesystem::remove_tree(&staged.root);
        }

        Ok(InstanceArtifact {
            package: staged.names.package,
            archive,
        })
    }

    /// Stage every instance without archiving
    pub fn stage(&self, dist: &Distribution) -> Result<Vec<StagedInstance>> {
        dist.validate()?;
        self.ensure_destination()?;
        dist.instances()
            .map(|affinity| self.stage_instance(dist, affinity))
            .collect()
    }

    /// Build the main package and every subpackage
    ///
    /// The first failing instance aborts the build; nothing is bundled then.
    pub fn build(&self, dist: &Distribution) -> Result<BuildReport> {
        dist.validate()?;
        self.ensure_destination()?;

        let mut report = BuildReport::default();
        for affinity in dist.instances() {
            report.instances.push(self.build_instance(dist, affinity)?);
        }

        if dist.subpackages.is_empty() {
            return Ok(report);
        }

        let bundle_path = self.bundle_path(dist);
        info!("Creating {}...", bundle_path.display());
        let archives: Vec<&Path> = report.instances.iter().map(|i| i.archive.as_path()).collect();
        bundle::create_bundle(&bundle_path, &archives)?;
        report.bundle = Some(bundle_path);

        if !self.config.keep_files {
            info!("Removing temporary distribution files...");
            for instance in &report.instances {
                filesystem::remove_file(&instance.archive);
            }
            report.archives_removed = true;
        }

        Ok(report)
    }

    fn ensure_destination(&self) -> Result<()> {
        fs::create_dir_all(&self.config.destination)
            .map_err(|e| Error::create("destination directory", &self.config.destination, e))
    }
}
