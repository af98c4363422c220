// src/deb/scripts.rs

//! Maintainer scripts and the templates file
//!
//! All five outputs are built the same way: a trigger decides whether the
//! file exists, then come an optional `#!/bin/sh` header, the explicit
//! command lines in order, and lines generated for each init script of the
//! instance. The differences live in the [`PHASES`] table.

use crate::distribution::{CommandPhase, FileEntry, LiteralSection, PartitionView};
use crate::error::Result;
use crate::filesystem;
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

/// Directory init scripts are installed to
pub const INIT_DIR: &str = "/etc/init.d";

/// Description of one generated file
pub struct PhaseSpec {
    /// File name under DEBIAN/
    pub file_name: &'static str,
    /// Used in error messages
    pub what: &'static str,
    /// Explicit commands that belong to this file
    pub trigger: CommandPhase,
    /// Whether init scripts alone force the file to exist
    pub services_trigger: bool,
    /// Whether the file starts with the interpreter and version stamp lines
    pub header: bool,
    pub mode: u32,
    /// Lines appended for each init script
    pub implicit: fn(&FileEntry, &mut String),
}

fn no_implicit(_: &FileEntry, _: &mut String) {}

fn enable_and_start(service: &FileEntry, out: &mut String) {
    // Let update-rc.d pick runlevels and ordering
    let _ = writeln!(out, "update-rc.d {} defaults", service.dst);
    let _ = writeln!(out, "{}/{} start", INIT_DIR, service.dst);
}

fn stop(service: &FileEntry, out: &mut String) {
    let _ = writeln!(out, "{}/{} stop", INIT_DIR, service.dst);
}

fn deregister_on_purge(service: &FileEntry, out: &mut String) {
    out.push_str("if [ purge = \"$1\" ]; then\n");
    let _ = writeln!(out, "\tupdate-rc.d {} remove", service.dst);
    out.push_str("fi\n");
}

/// Templates file followed by the four lifecycle scripts, in write order
pub static PHASES: [PhaseSpec; 5] = [
    PhaseSpec {
        file_name: "templates",
        what: "template file",
        trigger: CommandPhase::Literal(LiteralSection::Templates),
        services_trigger: false,
        header: false,
        mode: 0o644,
        implicit: no_implicit,
    },
    PhaseSpec {
        file_name: "preinst",
        what: "script file",
        trigger: CommandPhase::PreInstall,
        services_trigger: false,
        header: true,
        mode: 0o755,
        implicit: no_implicit,
    },
    PhaseSpec {
        file_name: "postinst",
        what: "script file",
        trigger: CommandPhase::PostInstall,
        services_trigger: true,
        header: true,
        mode: 0o755,
        implicit: enable_and_start,
    },
    PhaseSpec {
        file_name: "prerm",
        what: "script file",
        trigger: CommandPhase::PreRemove,
        services_trigger: true,
        header: true,
        mode: 0o755,
        implicit: stop,
    },
    PhaseSpec {
        file_name: "postrm",
        what: "script file",
        trigger: CommandPhase::PostRemove,
        services_trigger: true,
        header: true,
        mode: 0o755,
        implicit: deregister_on_purge,
    },
];

/// Look up a phase by its file name
pub fn phase(file_name: &str) -> Option<&'static PhaseSpec> {
    PHASES.iter().find(|p| p.file_name == file_name)
}

/// Render one phase, or `None` when nothing triggers it
pub fn render_phase(spec: &PhaseSpec, view: &PartitionView<'_>, stamp: &str) -> Option<String> {
    let explicit: Vec<&str> = view.commands_for(&spec.trigger).collect();
    let services: Vec<&FileEntry> = if spec.services_trigger {
        view.services().collect()
    } else {
        Vec::new()
    };

    if explicit.is_empty() && services.is_empty() {
        return None;
    }

    let mut out = String::new();
    if spec.header {
        out.push_str("#!/bin/sh\n");
        let _ = writeln!(out, "# {}", stamp);
    }
    for line in explicit {
        out.push_str(line);
        out.push('\n');
    }
    for service in services {
        (spec.implicit)(service, &mut out);
    }
    Some(out)
}

/// Write every triggered phase into `debian_dir`
///
/// Stops at the first file that cannot be created; files already written
/// are left in place. Returns the names of the files written.
pub fn write_all(
    debian_dir: &Path,
    view: &PartitionView<'_>,
    stamp: &str,
) -> Result<Vec<&'static str>> {
    let mut written = Vec::new();

    for spec in &PHASES {
        let Some(content) = render_phase(spec, view, stamp) else {
            continue;
        };

        debug!("Creating {} {}", spec.file_name, spec.what);
        let path = debian_dir.join(spec.file_name);
        filesystem::write_text(&path, spec.what, &content, spec.mode)?;
        written.push(spec.file_name);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{Affinity, CommandEntry, Distribution, FileKind};
    use std::fs;
    use std::os::unix::fs::MetadataExt;
    use tempfile::TempDir;

    const STAMP: &str = "debforge v0.1.0";

    fn service_only() -> Distribution {
        let mut dist = Distribution::new("hello", "1.0");
        dist.files
            .push(FileEntry::new(FileKind::Service, "init/hello", "hello"));
        dist
    }

    #[test]
    fn test_service_forces_postinst() {
        let dist = service_only();
        let view = dist.partition(Affinity::Main);

        let postinst = render_phase(phase("postinst").unwrap(), &view, STAMP).unwrap();
        assert_eq!(
            postinst,
            "#!/bin/sh\n# debforge v0.1.0\nupdate-rc.d hello defaults\n/etc/init.d/hello start\n"
        );

        let prerm = render_phase(phase("prerm").unwrap(), &view, STAMP).unwrap();
        assert!(prerm.ends_with("/etc/init.d/hello stop\n"));

        let postrm = render_phase(phase("postrm").unwrap(), &view, STAMP).unwrap();
        assert!(postrm.ends_with(
            "if [ purge = \"$1\" ]; then\n\tupdate-rc.d hello remove\nfi\n"
        ));

        // Services never trigger preinst or templates
        assert!(render_phase(phase("preinst").unwrap(), &view, STAMP).is_none());
        assert!(render_phase(phase("templates").unwrap(), &view, STAMP).is_none());
    }

    #[test]
    fn test_explicit_lines_precede_implicit_lines() {
        let mut dist = service_only();
        dist.commands = vec![
            CommandEntry::new(CommandPhase::PostInstall, "echo first"),
            CommandEntry::new(CommandPhase::PreInstall, "echo pre"),
            CommandEntry::new(CommandPhase::PostInstall, "echo second"),
        ];
        let view = dist.partition(Affinity::Main);

        let postinst = render_phase(phase("postinst").unwrap(), &view, STAMP).unwrap();
        let lines: Vec<_> = postinst.lines().collect();
        assert_eq!(
            lines,
            vec![
                "#!/bin/sh",
                "# debforge v0.1.0",
                "echo first",
                "echo second",
                "update-rc.d hello defaults",
                "/etc/init.d/hello start",
            ]
        );

        let preinst = render_phase(phase("preinst").unwrap(), &view, STAMP).unwrap();
        assert_eq!(preinst, "#!/bin/sh\n# debforge v0.1.0\necho pre\n");
    }

    #[test]
    fn test_templates_have_no_header() {
        let mut dist = Distribution::new("hello", "1.0");
        dist.commands = vec![
            CommandEntry::new(CommandPhase::Literal(LiteralSection::Templates), "Template: hello/q"),
            CommandEntry::new(CommandPhase::Literal(LiteralSection::Control), "Section: misc"),
            CommandEntry::new(CommandPhase::Literal(LiteralSection::Templates), "Type: boolean"),
        ];
        let view = dist.partition(Affinity::Main);
        let templates = render_phase(phase("templates").unwrap(), &view, STAMP).unwrap();
        assert_eq!(templates, "Template: hello/q\nType: boolean\n");
    }

    #[test]
    fn test_write_all_modes_and_absent_phases() {
        let temp = TempDir::new().unwrap();
        let mut dist = Distribution::new("hello", "1.0");
        dist.commands = vec![
            CommandEntry::new(CommandPhase::PreRemove, "echo bye"),
            CommandEntry::new(CommandPhase::Literal(LiteralSection::Templates), "Template: t"),
        ];
        let view = dist.partition(Affinity::Main);

        let written = write_all(temp.path(), &view, STAMP).unwrap();
        assert_eq!(written, vec!["templates", "prerm"]);

        let prerm = temp.path().join("prerm");
        assert_eq!(fs::metadata(&prerm).unwrap().mode() & 0o777, 0o755);
        let templates = temp.path().join("templates");
        assert_eq!(fs::metadata(&templates).unwrap().mode() & 0o777, 0o644);

        for absent in ["preinst", "postinst", "postrm"] {
            assert!(!temp.path().join(absent).exists(), "{} exists", absent);
        }
    }

    #[test]
    fn test_write_all_fails_fast() {
        let temp = TempDir::new().unwrap();
        let mut dist = Distribution::new("hello", "1.0");
        dist.commands
            .push(CommandEntry::new(CommandPhase::PreInstall, "true"));
        let view = dist.partition(Affinity::Main);

        let missing = temp.path().join("no-such-dir");
        let err = write_all(&missing, &view, STAMP).unwrap_err();
        assert!(err.to_string().contains("preinst"));
    }
}
