// src/config.rs

//! Build configuration
//!
//! Every knob of the pipeline lives in a `BuildConfig` value that is passed
//! to each component, so several builds with different settings can run in
//! the same process.

use crate::arch::{self, ArchNaming, HostKernel};
use crate::distribution::{Affinity, Distribution};
use std::path::PathBuf;

/// Naming and metadata conventions for the produced packages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductMode {
    /// `-` separators, Debian only renames `x86_64`
    #[default]
    Standard,
    /// `_` separators, full Debian architecture names, Installed-Size field
    Alternate,
}

impl ProductMode {
    /// Separator between name, version, release and platform
    pub fn separator(self) -> &'static str {
        match self {
            Self::Standard => "-",
            Self::Alternate => "_",
        }
    }

    /// Architecture naming used for file and directory names
    pub fn arch_naming(self) -> ArchNaming {
        match self {
            Self::Standard => ArchNaming::Native,
            Self::Alternate => ArchNaming::Debian,
        }
    }

    /// Whether the control file gets an Installed-Size field
    pub fn adds_installed_size(self) -> bool {
        self == Self::Alternate
    }
}

/// Settings for one distribution build
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory receiving staging trees, archives and the bundle
    pub destination: PathBuf,
    /// Platform suffix of file names; empty for none
    pub platform: String,
    /// Architecture token for the control file
    pub machine: String,
    pub mode: ProductMode,
    /// Keep staging trees and per-instance archives
    pub keep_files: bool,
    pub kernel: HostKernel,
    /// Written as a comment on the second line of every maintainer script
    pub version_stamp: String,
}

impl BuildConfig {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        let machine = arch::host_machine().to_string();
        Self {
            destination: destination.into(),
            platform: machine.clone(),
            machine,
            mode: ProductMode::Standard,
            keep_files: false,
            kernel: HostKernel::current(),
            version_stamp: default_version_stamp(),
        }
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn with_machine(mut self, machine: impl Into<String>) -> Self {
        self.machine = machine.into();
        self
    }

    pub fn with_mode(mut self, mode: ProductMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn keep_files(mut self, keep: bool) -> Self {
        self.keep_files = keep;
        self
    }

    pub fn with_kernel(mut self, kernel: HostKernel) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn with_version_stamp(mut self, stamp: impl Into<String>) -> Self {
        self.version_stamp = stamp.into();
        self
    }

    /// Platform suffix after architecture normalisation
    pub fn platform_name(&self) -> String {
        arch::normalize_arch(&self.platform, self.mode.arch_naming(), self.kernel)
    }

    /// Architecture field of the control file
    pub fn control_arch(&self) -> String {
        arch::normalize_arch(&self.machine, ArchNaming::Debian, self.kernel)
    }

    /// `<base><sep><version>[<sep><release>][<sep><platform>]`
    fn versioned_name(&self, dist: &Distribution, base: &str) -> String {
        let sep = self.mode.separator();
        let mut name = format!("{}{}{}", base, sep, dist.version);
        if let Some(release) = dist.release.as_deref().filter(|r| !r.is_empty()) {
            name.push_str(sep);
            name.push_str(release);
        }
        let platform = self.platform_name();
        if !platform.is_empty() {
            name.push_str(sep);
            name.push_str(&platform);
        }
        name
    }

    /// Package and directory names of one instance
    pub fn instance_names(&self, dist: &Distribution, affinity: Affinity) -> InstanceNames {
        let package = match dist.subpackage_name(affinity) {
            Some(sub) => format!("{}{}{}", dist.product, self.mode.separator(), sub),
            None => dist.product.clone(),
        };
        let directory = self.versioned_name(dist, &package);
        InstanceNames { package, directory }
    }

    /// Path of the `.deb.tgz` container
    pub fn bundle_path(&self, dist: &Distribution) -> PathBuf {
        self.destination
            .join(format!("{}.deb.tgz", self.versioned_name(dist, &dist.product)))
    }
}

/// Names derived for one package instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceNames {
    /// Package: field, `product` or `product<sep>subpackage`
    pub package: String,
    /// Staging directory name, also the archive stem
    pub directory: String,
}

fn default_version_stamp() -> String {
    format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
