// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use debforge::{
    Affinity, Archiver, CommandEntry, CommandPhase, DependencyEntry, DependencyKind,
    DependencyTarget, DescriptionEntry, Distribution, FileEntry, FileKind, LiteralSection,
    SizeProbe, VersionRange,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Source files referenced by [`sample_distribution`].
pub struct Sources {
    pub dir: TempDir,
}

impl Sources {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, content: &str| fs::write(dir.path().join(name), content).unwrap();
        write("hello", "#!/bin/sh\necho hello\n");
        write("hello.conf", "greeting=hello\n");
        write("hello.init", "#!/bin/sh\n# init script\n");
        write("README", "Hello documentation\n");
        Self { dir }
    }

    pub fn path(&self, name: &str) -> String {
        self.dir.path().join(name).to_str().unwrap().to_string()
    }
}

/// A distribution without subpackages: one binary, one config file, one init
/// script and a versioned dependency on libc6.
pub fn simple_distribution(sources: &Sources) -> Distribution {
    let mut dist = Distribution::new("hello", "1.0");
    dist.release = Some("1".to_string());
    dist.vendor = "Example Corp <pkg@example.com>".to_string();
    dist.title = "Hello world".to_string();
    dist.copyright = "2024 Example Corp".to_string();

    dist.files = vec![
        FileEntry::new(FileKind::Regular, sources.path("hello"), "/usr/bin/hello").with_mode(0o755),
        FileEntry::new(FileKind::Config, sources.path("hello.conf"), "/etc/hello.conf"),
        FileEntry::new(FileKind::Service, sources.path("hello.init"), "hello"),
    ];
    dist.depends.push(DependencyEntry::new(
        DependencyKind::Requires,
        DependencyTarget::parse("libc6"),
        VersionRange::at_least("2.31"),
    ));
    dist.descriptions.push(DescriptionEntry::new("Prints a greeting."));
    dist
}

/// [`simple_distribution`] plus "docs" and "dev" subpackages.
///
/// The docs subpackage ships the README, depends on the exact main version
/// and carries a templates literal; dev only has a post-install command.
pub fn sample_distribution(sources: &Sources) -> Distribution {
    let mut dist = simple_distribution(sources);
    let docs = dist.add_subpackage("docs");
    let dev = dist.add_subpackage("dev");

    dist.files.push(
        FileEntry::new(FileKind::Regular, sources.path("README"), "/usr/share/doc/hello/README")
            .in_subpackage(docs),
    );
    dist.files.push(
        FileEntry::new(FileKind::Directory, "", "/usr/include/hello").in_subpackage(dev),
    );
    dist.depends.push(
        DependencyEntry::new(
            DependencyKind::Requires,
            DependencyTarget::SelfProduct,
            VersionRange::between("1.0", "1.0"),
        )
        .in_subpackage(docs),
    );
    dist.commands.push(
        CommandEntry::new(
            CommandPhase::Literal(LiteralSection::Templates),
            "Template: hello-docs/path",
        )
        .in_subpackage(docs),
    );
    dist.commands.push(
        CommandEntry::new(CommandPhase::PostInstall, "ldconfig").in_subpackage(dev),
    );
    dist.descriptions
        .push(DescriptionEntry::new("Documentation for hello.").in_subpackage(docs));
    dist
}

/// Archiver that records each call and writes a small placeholder archive.
///
/// The placeholder holds the staged control file, so tests can tell the
/// archive was produced from a complete staging tree.
#[derive(Clone, Default)]
pub struct RecordingArchiver {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_on: Option<String>,
}

impl RecordingArchiver {
    pub fn failing_on(dir: &str) -> Self {
        Self {
            fail_on: Some(dir.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Archiver for RecordingArchiver {
    fn build(&self, workdir: &Path, instance_dir: &str) -> debforge::Result<PathBuf> {
        self.calls.lock().unwrap().push(instance_dir.to_string());
        if self.fail_on.as_deref() == Some(instance_dir) {
            return Err(debforge::Error::CommandError(format!(
                "dpkg --build {} failed",
                instance_dir
            )));
        }

        let control = fs::read(workdir.join(instance_dir).join("DEBIAN/control"))?;
        let archive = workdir.join(format!("{}.deb", instance_dir));
        fs::write(&archive, control)?;
        Ok(archive)
    }
}

/// Size probe returning a constant.
///
/// The instance directory must already hold its control file when measured.
pub struct FixedSize(pub u64);

impl SizeProbe for FixedSize {
    fn measure(&self, dir: &Path) -> debforge::Result<u64> {
        assert!(
            dir.join("DEBIAN/control").is_file(),
            "{} has no control file yet",
            dir.display()
        );
        Ok(self.0)
    }
}

/// Size probe recording, per measured directory, whether `marker` (relative
/// to it) existed at measurement time. Reports 1 KiB if it did, 0 otherwise.
#[derive(Clone)]
pub struct MarkerProbe {
    pub marker: PathBuf,
    pub seen: Arc<Mutex<Vec<bool>>>,
}

impl MarkerProbe {
    pub fn new(marker: impl Into<PathBuf>) -> Self {
        Self {
            marker: marker.into(),
            seen: Arc::default(),
        }
    }

    pub fn seen(&self) -> Vec<bool> {
        self.seen.lock().unwrap().clone()
    }
}

impl SizeProbe for MarkerProbe {
    fn measure(&self, dir: &Path) -> debforge::Result<u64> {
        let present = dir.join(&self.marker).exists();
        self.seen.lock().unwrap().push(present);
        Ok(u64::from(present))
    }
}

/// Affinity of a named subpackage, panicking when it is not declared.
pub fn subpackage(dist: &Distribution, name: &str) -> Affinity {
    dist.subpackage(name).unwrap()
}
