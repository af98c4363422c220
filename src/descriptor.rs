// src/descriptor.rs
//! Distribution descriptor parsing
//!
//! A descriptor is a TOML document naming the product, its subpackages and
//! the flat lists of files, commands, dependencies and description lines.
//! Parsing resolves subpackage names to [`Affinity`] keys, so every entity
//! of the resulting [`Distribution`] points at a declared instance.

use crate::config::{BuildConfig, ProductMode};
use crate::distribution::{
    Affinity, CommandEntry, CommandPhase, DependencyEntry, DependencyKind, DependencyTarget,
    DescriptionEntry, Distribution, FileEntry, FileKind, LiteralSection, VersionRange,
    is_package_name, is_version_string,
};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("Failed to read descriptor file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse descriptor: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unknown subpackage '{name}' referenced by {context}")]
    UnknownSubpackage { name: String, context: String },

    #[error("Invalid descriptor: {0}")]
    Invalid(String),
}

/// Root structure of a descriptor file
#[derive(Debug, Clone, Deserialize)]
pub struct Descriptor {
    pub product: Product,

    #[serde(default)]
    pub files: Vec<FileSpec>,

    #[serde(default)]
    pub commands: Vec<CommandSpec>,

    #[serde(default)]
    pub depends: Vec<DependSpec>,

    #[serde(default)]
    pub descriptions: Vec<DescriptionSpec>,

    /// Defaults for the build, overridden by command-line flags
    #[serde(default)]
    pub build: BuildDefaults,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub name: String,
    pub version: String,

    #[serde(default)]
    pub release: Option<String>,

    #[serde(default)]
    pub vendor: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub copyright: String,

    #[serde(default)]
    pub subpackages: Vec<String>,
}

/// File entry type as spelled in descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    File,
    Config,
    Init,
    Dir,
    Link,
}

impl From<FileType> for FileKind {
    fn from(t: FileType) -> Self {
        match t {
            FileType::File => FileKind::Regular,
            FileType::Config => FileKind::Config,
            FileType::Init => FileKind::Service,
            FileType::Dir => FileKind::Directory,
            FileType::Link => FileKind::Symlink,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileSpec {
    #[serde(rename = "type")]
    pub file_type: FileType,

    #[serde(default)]
    pub src: String,

    pub dst: String,

    #[serde(default = "default_owner")]
    pub user: String,

    #[serde(default = "default_owner")]
    pub group: String,

    /// Octal mode string such as "0755"
    #[serde(default)]
    pub mode: Option<String>,

    #[serde(default)]
    pub subpackage: Option<String>,
}

fn default_owner() -> String {
    "root".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseName {
    PreInstall,
    PostInstall,
    PreRemove,
    PostRemove,
    Literal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandSpec {
    pub phase: PhaseName,

    /// Required for literal commands: "control", "templates", ...
    #[serde(default)]
    pub section: Option<String>,

    pub text: String,

    #[serde(default)]
    pub subpackage: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependKind {
    Requires,
    Conflicts,
    Replaces,
    Provides,
}

impl From<DependKind> for DependencyKind {
    fn from(k: DependKind) -> Self {
        match k {
            DependKind::Requires => DependencyKind::Requires,
            DependKind::Conflicts => DependencyKind::Conflicts,
            DependKind::Replaces => DependencyKind::Replaces,
            DependKind::Provides => DependencyKind::Provides,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DependSpec {
    #[serde(default = "default_depend_kind")]
    pub kind: DependKind,

    /// Package name, or "_self" for the product being built
    pub product: String,

    #[serde(default)]
    pub lower: Option<String>,

    #[serde(default)]
    pub upper: Option<String>,

    #[serde(default)]
    pub subpackage: Option<String>,
}

fn default_depend_kind() -> DependKind {
    DependKind::Requires
}

#[derive(Debug, Clone, Deserialize)]
pub struct DescriptionSpec {
    pub text: String,

    #[serde(default)]
    pub subpackage: Option<String>,
}

/// Optional `[build]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildDefaults {
    #[serde(default)]
    pub platform: Option<String>,

    #[serde(default)]
    pub machine: Option<String>,

    #[serde(default)]
    pub alternate: bool,

    #[serde(default)]
    pub keep_files: bool,
}

impl BuildDefaults {
    /// Apply these defaults to a configuration
    pub fn apply(&self, mut config: BuildConfig) -> BuildConfig {
        if let Some(platform) = &self.platform {
            config.platform = platform.clone();
        }
        if let Some(machine) = &self.machine {
            config.machine = machine.clone();
        }
        if self.alternate {
            config.mode = ProductMode::Alternate;
        }
        config.keep_files |= self.keep_files;
        config
    }
}

impl Descriptor {
    /// Load a descriptor from a file path
    pub fn from_file(path: &Path) -> Result<Self, DescriptorError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a descriptor from a TOML string
    pub fn parse(content: &str) -> Result<Self, DescriptorError> {
        let descriptor: Descriptor = toml::from_str(content)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Validate required fields
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.product.name.is_empty() {
            return Err(DescriptorError::MissingField("product.name".to_string()));
        }
        if self.product.version.is_empty() {
            return Err(DescriptorError::MissingField("product.version".to_string()));
        }
        if !is_package_name(&self.product.name) {
            return Err(DescriptorError::Invalid(format!(
                "product name '{}' is not a valid package name",
                self.product.name
            )));
        }
        if !is_version_string(&self.product.version) {
            return Err(DescriptorError::Invalid(format!(
                "version '{}' is not a valid Debian version",
                self.product.version
            )));
        }
        if let Some(release) = self.product.release.as_deref()
            && !release.is_empty()
            && !is_version_string(release)
        {
            return Err(DescriptorError::Invalid(format!(
                "release '{}' is not a valid Debian revision",
                release
            )));
        }
        for (i, name) in self.product.subpackages.iter().enumerate() {
            if name.is_empty() {
                return Err(DescriptorError::Invalid("empty subpackage name".to_string()));
            }
            if !is_package_name(name) {
                return Err(DescriptorError::Invalid(format!(
                    "subpackage '{}' is not a valid package name",
                    name
                )));
            }
            if self.product.subpackages[..i].contains(name) {
                return Err(DescriptorError::Invalid(format!(
                    "subpackage '{}' declared twice",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Resolve into the in-memory distribution model
    pub fn to_distribution(&self) -> Result<Distribution, DescriptorError> {
        let product = &self.product;
        let mut dist = Distribution::new(&product.name, &product.version);
        dist.release = product.release.clone().filter(|r| !r.is_empty());
        dist.vendor = product.vendor.clone();
        dist.title = product.title.clone();
        dist.copyright = product.copyright.clone();
        dist.subpackages = product.subpackages.clone();

        for spec in &self.files {
            let kind = FileKind::from(spec.file_type);
            let mode = match &spec.mode {
                Some(mode) => parse_mode(mode)?,
                None => kind.default_mode(),
            };
            let affinity = self.affinity(spec.subpackage.as_deref(), &spec.dst)?;
            dist.files.push(
                FileEntry::new(kind, &spec.src, &spec.dst)
                    .with_mode(mode)
                    .with_owner(&spec.user, &spec.group)
                    .in_subpackage(affinity),
            );
        }

        for spec in &self.commands {
            let phase = match spec.phase {
                PhaseName::PreInstall => CommandPhase::PreInstall,
                PhaseName::PostInstall => CommandPhase::PostInstall,
                PhaseName::PreRemove => CommandPhase::PreRemove,
                PhaseName::PostRemove => CommandPhase::PostRemove,
                PhaseName::Literal => {
                    let section = spec.section.as_deref().ok_or_else(|| {
                        DescriptorError::MissingField(format!(
                            "section for literal command '{}'",
                            spec.text
                        ))
                    })?;
                    CommandPhase::Literal(LiteralSection::parse(section))
                }
            };
            let affinity = self.affinity(spec.subpackage.as_deref(), &spec.text)?;
            dist.commands
                .push(CommandEntry::new(phase, &spec.text).in_subpackage(affinity));
        }

        for spec in &self.depends {
            let range = VersionRange {
                lower: spec.lower.clone().filter(|v| !v.is_empty()),
                upper: spec.upper.clone().filter(|v| !v.is_empty()),
            };
            let affinity = self.affinity(spec.subpackage.as_deref(), &spec.product)?;
            dist.depends.push(
                DependencyEntry::new(spec.kind.into(), DependencyTarget::parse(&spec.product), range)
                    .in_subpackage(affinity),
            );
        }

        for spec in &self.descriptions {
            let affinity = self.affinity(spec.subpackage.as_deref(), &spec.text)?;
            dist.descriptions
                .push(DescriptionEntry::new(&spec.text).in_subpackage(affinity));
        }

        Ok(dist)
    }

    fn affinity(&self, subpackage: Option<&str>, context: &str) -> Result<Affinity, DescriptorError> {
        match subpackage {
            None => Ok(Affinity::Main),
            Some(name) => self
                .product
                .subpackages
                .iter()
                .position(|s| s == name)
                .map(Affinity::Subpackage)
                .ok_or_else(|| DescriptorError::UnknownSubpackage {
                    name: name.to_string(),
                    context: context.to_string(),
                }),
        }
    }
}

/// Parse an octal mode string ("0755", "755")
pub fn parse_mode(mode: &str) -> Result<u32, DescriptorError> {
    let digits = mode.trim().trim_start_matches("0o");
    u32::from_str_radix(digits, 8)
        .ok()
        .filter(|m| *m <= 0o7777)
        .ok_or_else(|| DescriptorError::Invalid(format!("invalid mode string: {}", mode)))
}
