// src/lib.rs

//! debforge
//!
//! Synthesizes Debian binary packages from a product distribution.
//!
//! # Architecture
//!
//! - Distribution: product metadata plus files, commands, dependencies and
//!   descriptions, each tagged with the package instance it belongs to
//! - Partitioning: one read-only view per instance (main product first,
//!   then each subpackage in declaration order)
//! - Synthesis: DEBIAN/control, maintainer scripts, conffiles and the file
//!   layout are written to a staging tree, then handed to `dpkg --build`
//! - Bundling: distributions with subpackages end up in one `.deb.tgz`

pub mod arch;
pub mod bundle;
pub mod config;
pub mod deb;
pub mod descriptor;
pub mod distribution;
mod error;
pub mod filesystem;

pub use arch::{ArchNaming, HostKernel};
pub use config::{BuildConfig, InstanceNames, ProductMode};
pub use deb::{Archiver, BuildReport, DebBuilder, DpkgArchiver, DuProbe, InstanceArtifact, SizeProbe};
pub use descriptor::{Descriptor, DescriptorError};
pub use distribution::{
    Affinity, CommandEntry, CommandPhase, DependencyEntry, DependencyKind, DependencyTarget,
    DescriptionEntry, Distribution, FileEntry, FileKind, LiteralSection, PartitionView, VersionRange,
};
pub use error::{Error, Result};
