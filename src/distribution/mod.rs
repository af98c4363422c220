// src/distribution/mod.rs

//! In-memory model of a software distribution
//!
//! A `Distribution` owns flat, ordered lists of files, commands, dependencies
//! and description lines. Each entity carries an [`Affinity`] naming the
//! package instance it belongs to: the main package or one of the declared
//! subpackages. The lists are never copied per instance; the
//! [`partition`] module filters them by affinity on demand.

pub mod partition;

pub use partition::PartitionView;

use crate::error::{Error, Result};
use std::fmt;

/// Package instance an entity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Affinity {
    /// The main product package
    #[default]
    Main,
    /// Index into `Distribution::subpackages`
    Subpackage(usize),
}

/// Kind of a file entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Plain file copied into the tree
    Regular,
    /// Configuration file, listed in conffiles
    Config,
    /// Init script installed under /etc/init.d and managed with update-rc.d
    Service,
    /// Directory created with its own mode and ownership
    Directory,
    /// Symbolic link; `src` holds the link target
    Symlink,
}

impl FileKind {
    /// Default permission mode when the descriptor gives none
    pub fn default_mode(self) -> u32 {
        match self {
            Self::Directory | Self::Service => 0o755,
            Self::Regular | Self::Config | Self::Symlink => 0o644,
        }
    }
}

/// A file, directory or link in the distribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub kind: FileKind,
    pub affinity: Affinity,
    /// Source path on the build host (link target for symlinks)
    pub src: String,
    /// Destination path inside the package; for service files, the script name
    pub dst: String,
    pub user: String,
    pub group: String,
    pub mode: u32,
}

impl FileEntry {
    pub fn new(kind: FileKind, src: impl Into<String>, dst: impl Into<String>) -> Self {
        Self {
            kind,
            affinity: Affinity::Main,
            src: src.into(),
            dst: dst.into(),
            user: "root".to_string(),
            group: "root".to_string(),
            mode: kind.default_mode(),
        }
    }

    pub fn in_subpackage(mut self, affinity: Affinity) -> Self {
        self.affinity = affinity;
        self
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_owner(mut self, user: impl Into<String>, group: impl Into<String>) -> Self {
        self.user = user.into();
        self.group = group.into();
        self
    }
}

/// Section of a literal command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralSection {
    /// Appended verbatim to DEBIAN/control
    Control,
    /// Written to DEBIAN/templates
    Templates,
    /// Meant for another packaging format; ignored here
    Other(String),
}

impl LiteralSection {
    pub fn parse(s: &str) -> Self {
        match s {
            "control" => Self::Control,
            "templates" => Self::Templates,
            other => Self::Other(other.to_string()),
        }
    }
}

/// When a command runs, or where literal text goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandPhase {
    PreInstall,
    PostInstall,
    PreRemove,
    PostRemove,
    Literal(LiteralSection),
}

impl fmt::Display for CommandPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreInstall => write!(f, "pre-install"),
            Self::PostInstall => write!(f, "post-install"),
            Self::PreRemove => write!(f, "pre-remove"),
            Self::PostRemove => write!(f, "post-remove"),
            Self::Literal(LiteralSection::Control) => write!(f, "literal(control)"),
            Self::Literal(LiteralSection::Templates) => write!(f, "literal(templates)"),
            Self::Literal(LiteralSection::Other(s)) => write!(f, "literal({})", s),
        }
    }
}

/// One line of script or literal text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntry {
    pub phase: CommandPhase,
    pub affinity: Affinity,
    pub text: String,
}

impl CommandEntry {
    pub fn new(phase: CommandPhase, text: impl Into<String>) -> Self {
        Self {
            phase,
            affinity: Affinity::Main,
            text: text.into(),
        }
    }

    pub fn in_subpackage(mut self, affinity: Affinity) -> Self {
        self.affinity = affinity;
        self
    }
}

/// Relationship expressed by a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Requires,
    Conflicts,
    Replaces,
    Provides,
}

impl DependencyKind {
    /// Control file order
    pub const ALL: [DependencyKind; 4] = [
        Self::Requires,
        Self::Conflicts,
        Self::Replaces,
        Self::Provides,
    ];

    /// Control file field name
    pub fn field(self) -> &'static str {
        match self {
            Self::Requires => "Depends",
            Self::Conflicts => "Conflicts",
            Self::Replaces => "Replaces",
            Self::Provides => "Provides",
        }
    }
}

/// Product a dependency points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyTarget {
    /// The product currently being built
    SelfProduct,
    Package(String),
}

impl DependencyTarget {
    /// Spelling of `SelfProduct` in descriptors
    pub const SELF_SENTINEL: &'static str = "_self";

    pub fn parse(s: &str) -> Self {
        if s == Self::SELF_SENTINEL {
            Self::SelfProduct
        } else {
            Self::Package(s.to_string())
        }
    }

    /// Concrete package name, resolving `SelfProduct` to `product`
    pub fn resolve<'a>(&'a self, product: &'a str) -> &'a str {
        match self {
            Self::SelfProduct => product,
            Self::Package(name) => name,
        }
    }
}

/// Version constraint of a dependency; `None` means unbounded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionRange {
    pub lower: Option<String>,
    pub upper: Option<String>,
}

impl VersionRange {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn at_least(lower: impl Into<String>) -> Self {
        Self {
            lower: Some(lower.into()),
            upper: None,
        }
    }

    pub fn at_most(upper: impl Into<String>) -> Self {
        Self {
            lower: None,
            upper: Some(upper.into()),
        }
    }

    pub fn between(lower: impl Into<String>, upper: impl Into<String>) -> Self {
        Self {
            lower: Some(lower.into()),
            upper: Some(upper.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEntry {
    pub kind: DependencyKind,
    pub affinity: Affinity,
    pub target: DependencyTarget,
    pub range: VersionRange,
}

impl DependencyEntry {
    pub fn new(kind: DependencyKind, target: DependencyTarget, range: VersionRange) -> Self {
        Self {
            kind,
            affinity: Affinity::Main,
            target,
            range,
        }
    }

    pub fn in_subpackage(mut self, affinity: Affinity) -> Self {
        self.affinity = affinity;
        self
    }
}

/// One line of the extended package description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionEntry {
    pub affinity: Affinity,
    pub text: String,
}

impl DescriptionEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            affinity: Affinity::Main,
            text: text.into(),
        }
    }

    pub fn in_subpackage(mut self, affinity: Affinity) -> Self {
        self.affinity = affinity;
        self
    }
}

/// Everything needed to build the main package and its subpackages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Distribution {
    /// Product short name, used as the Debian package name
    pub product: String,
    pub version: String,
    pub release: Option<String>,
    pub vendor: String,
    /// One-line product title (Description: field)
    pub title: String,
    pub copyright: String,
    pub subpackages: Vec<String>,
    pub files: Vec<FileEntry>,
    pub commands: Vec<CommandEntry>,
    pub depends: Vec<DependencyEntry>,
    pub descriptions: Vec<DescriptionEntry>,
}

impl Distribution {
    pub fn new(product: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Declare a subpackage and return its affinity key
    pub fn add_subpackage(&mut self, name: impl Into<String>) -> Affinity {
        self.subpackages.push(name.into());
        Affinity::Subpackage(self.subpackages.len() - 1)
    }

    /// Affinity key of a declared subpackage
    pub fn subpackage(&self, name: &str) -> Option<Affinity> {
        self.subpackages
            .iter()
            .position(|s| s == name)
            .map(Affinity::Subpackage)
    }

    /// Name of the subpackage behind `affinity`, `None` for the main package
    pub fn subpackage_name(&self, affinity: Affinity) -> Option<&str> {
        match affinity {
            Affinity::Main => None,
            Affinity::Subpackage(idx) => self.subpackages.get(idx).map(String::as_str),
        }
    }

    /// Main package first, then every subpackage in declaration order
    pub fn instances(&self) -> impl Iterator<Item = Affinity> + '_ {
        std::iter::once(Affinity::Main)
            .chain((0..self.subpackages.len()).map(Affinity::Subpackage))
    }

    /// Version field value: `version` or `version-release`
    pub fn full_version(&self) -> String {
        match self.release.as_deref() {
            Some(release) if !release.is_empty() => format!("{}-{}", self.version, release),
            _ => self.version.clone(),
        }
    }

    /// Check the invariants the synthesis relies on
    ///
    /// Names and version strings end up in directory and file names under
    /// the destination, so they are held to the Debian character sets.
    pub fn validate(&self) -> Result<()> {
        if self.product.is_empty() {
            return Err(Error::ValidationError("product name is empty".to_string()));
        }
        if !is_package_name(&self.product) {
            return Err(Error::ValidationError(format!(
                "invalid product name '{}'",
                self.product
            )));
        }
        if self.version.is_empty() {
            return Err(Error::ValidationError(format!(
                "product {} has an empty version",
                self.product
            )));
        }
        if !is_version_string(&self.version) {
            return Err(Error::ValidationError(format!(
                "invalid version '{}'",
                self.version
            )));
        }
        if let Some(release) = self.release.as_deref()
            && !release.is_empty()
            && !is_version_string(release)
        {
            return Err(Error::ValidationError(format!(
                "invalid release '{}'",
                release
            )));
        }
        for name in &self.subpackages {
            if !is_package_name(name) {
                return Err(Error::ValidationError(format!(
                    "invalid subpackage name '{}'",
                    name
                )));
            }
        }

        let affinities = self
            .files
            .iter()
            .map(|f| f.affinity)
            .chain(self.commands.iter().map(|c| c.affinity))
            .chain(self.depends.iter().map(|d| d.affinity))
            .chain(self.descriptions.iter().map(|d| d.affinity));

        for affinity in affinities {
            if let Affinity::Subpackage(idx) = affinity
                && idx >= self.subpackages.len()
            {
                return Err(Error::ValidationError(format!(
                    "entry refers to undeclared subpackage #{}",
                    idx
                )));
            }
        }

        Ok(())
    }
}

/// Debian package name: `[a-z0-9][a-z0-9+.-]*`
pub fn is_package_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c.is_ascii_digit())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '-' | '.'))
}

/// Debian version or revision: alphanumerics and `.+~:-`, starting with a digit
pub fn is_version_string(version: &str) -> bool {
    let mut chars = version.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_digit())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '~' | ':' | '-'))
}
