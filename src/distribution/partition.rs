// src/distribution/partition.rs

//! Per-instance view of a distribution
//!
//! A stable filter over the distribution's entity lists. Entries keep their
//! original relative order; nothing is copied, added or reordered.

use super::{
    Affinity, CommandEntry, CommandPhase, DependencyEntry, DependencyKind, DescriptionEntry,
    Distribution, FileEntry, FileKind, LiteralSection,
};

/// Entities of one package instance, borrowed from the distribution
#[derive(Debug, Clone)]
pub struct PartitionView<'a> {
    pub affinity: Affinity,
    pub files: Vec<&'a FileEntry>,
    pub commands: Vec<&'a CommandEntry>,
    pub depends: Vec<&'a DependencyEntry>,
    pub descriptions: Vec<&'a DescriptionEntry>,
}

impl<'a> PartitionView<'a> {
    /// Files of one kind
    pub fn files_of(&self, kind: FileKind) -> impl Iterator<Item = &'a FileEntry> + '_ {
        self.files.iter().copied().filter(move |f| f.kind == kind)
    }

    /// Init scripts of this instance
    pub fn services(&self) -> impl Iterator<Item = &'a FileEntry> + '_ {
        self.files_of(FileKind::Service)
    }

    pub fn has_services(&self) -> bool {
        self.services().next().is_some()
    }

    /// Command lines for one phase
    pub fn commands_for<'p>(
        &'p self,
        phase: &'p CommandPhase,
    ) -> impl Iterator<Item = &'a str> + 'p {
        self.commands
            .iter()
            .copied()
            .filter(move |c| &c.phase == phase)
            .map(|c| c.text.as_str())
    }

    /// Literal lines for one section
    pub fn literals<'p>(&'p self, section: &'p LiteralSection) -> impl Iterator<Item = &'a str> + 'p {
        self.commands
            .iter()
            .copied()
            .filter(move |c| matches!(&c.phase, CommandPhase::Literal(s) if s == section))
            .map(|c| c.text.as_str())
    }

    /// Dependencies of one kind
    pub fn depends_of(&self, kind: DependencyKind) -> impl Iterator<Item = &'a DependencyEntry> + '_ {
        self.depends.iter().copied().filter(move |d| d.kind == kind)
    }
}

impl Distribution {
    /// Select the entities belonging to `affinity`
    pub fn partition(&self, affinity: Affinity) -> PartitionView<'_> {
        PartitionView {
            affinity,
            files: self.files.iter().filter(|f| f.affinity == affinity).collect(),
            commands: self
                .commands
                .iter()
                .filter(|c| c.affinity == affinity)
                .collect(),
            depends: self
                .depends
                .iter()
                .filter(|d| d.affinity == affinity)
                .collect(),
            descriptions: self
                .descriptions
                .iter()
                .filter(|d| d.affinity == affinity)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{DependencyTarget, VersionRange};

    fn sample() -> Distribution {
        let mut dist = Distribution::new("hello", "1.0");
        let docs = dist.add_subpackage("docs");
        let devel = dist.add_subpackage("devel");

        dist.files = vec![
            FileEntry::new(FileKind::Regular, "a", "/usr/bin/a"),
            FileEntry::new(FileKind::Regular, "b", "/usr/share/doc/b").in_subpackage(docs),
            FileEntry::new(FileKind::Config, "c", "/etc/c"),
            FileEntry::new(FileKind::Regular, "d", "/usr/include/d.h").in_subpackage(devel),
            FileEntry::new(FileKind::Service, "e", "hello"),
            FileEntry::new(FileKind::Regular, "f", "/usr/share/doc/f").in_subpackage(docs),
        ];
        dist.commands = vec![
            CommandEntry::new(CommandPhase::PostInstall, "one"),
            CommandEntry::new(CommandPhase::PostInstall, "two").in_subpackage(docs),
            CommandEntry::new(CommandPhase::PreRemove, "three"),
            CommandEntry::new(CommandPhase::PostInstall, "four"),
            CommandEntry::new(CommandPhase::Literal(LiteralSection::Control), "Section: misc"),
        ];
        dist.depends = vec![
            DependencyEntry::new(
                DependencyKind::Requires,
                DependencyTarget::SelfProduct,
                VersionRange::any(),
            )
            .in_subpackage(devel),
            DependencyEntry::new(
                DependencyKind::Conflicts,
                DependencyTarget::parse("old-hello"),
                VersionRange::any(),
            ),
        ];
        dist.descriptions = vec![
            DescriptionEntry::new("main line"),
            DescriptionEntry::new("docs line").in_subpackage(docs),
        ];
        dist
    }

    #[test]
    fn test_partition_preserves_order() {
        let dist = sample();
        let main = dist.partition(Affinity::Main);

        let dsts: Vec<_> = main.files.iter().map(|f| f.dst.as_str()).collect();
        assert_eq!(dsts, vec!["/usr/bin/a", "/etc/c", "hello"]);

        let post: Vec<_> = main.commands_for(&CommandPhase::PostInstall).collect();
        assert_eq!(post, vec!["one", "four"]);

        let control: Vec<_> = main.literals(&LiteralSection::Control).collect();
        assert_eq!(control, vec!["Section: misc"]);
        assert!(main.has_services());
    }

    #[test]
    fn test_partitions_cover_each_entry_exactly_once() {
        let dist = sample();
        let views: Vec<_> = dist.instances().map(|a| dist.partition(a)).collect();

        let total_files: usize = views.iter().map(|v| v.files.len()).sum();
        let total_commands: usize = views.iter().map(|v| v.commands.len()).sum();
        let total_depends: usize = views.iter().map(|v| v.depends.len()).sum();
        let total_descriptions: usize = views.iter().map(|v| v.descriptions.len()).sum();
        assert_eq!(total_files, dist.files.len());
        assert_eq!(total_commands, dist.commands.len());
        assert_eq!(total_depends, dist.depends.len());
        assert_eq!(total_descriptions, dist.descriptions.len());

        // Every original entry shows up in exactly one view, by identity
        for file in &dist.files {
            let hits = views
                .iter()
                .filter(|v| v.files.iter().any(|f| std::ptr::eq(*f, file)))
                .count();
            assert_eq!(hits, 1, "{} appears {} times", file.dst, hits);
        }

        let docs = &views[1];
        let dsts: Vec<_> = docs.files.iter().map(|f| f.dst.as_str()).collect();
        assert_eq!(dsts, vec!["/usr/share/doc/b", "/usr/share/doc/f"]);
    }

    #[test]
    fn test_unknown_affinity_yields_empty_view() {
        let dist = sample();
        let view = dist.partition(Affinity::Subpackage(9));
        assert!(view.files.is_empty());
        assert!(view.commands.is_empty());
        assert!(view.depends.is_empty());
        assert!(view.descriptions.is_empty());
    }
}
