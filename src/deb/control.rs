// src/deb/control.rs

//! DEBIAN/control writer

use crate::distribution::{DependencyEntry, DependencyKind, Distribution, LiteralSection, PartitionView};
use crate::error::Result;
use crate::filesystem;
use std::path::Path;
use tracing::debug;

/// Format one dependency clause
///
/// A closed range needs two clauses in Debian syntax, so the product name is
/// repeated for the upper bound.
pub fn format_clause(dep: &DependencyEntry, product: &str) -> String {
    let name = dep.target.resolve(product);
    match (&dep.range.lower, &dep.range.upper) {
        (None, None) => name.to_string(),
        (None, Some(upper)) => format!("{} (<= {})", name, upper),
        (Some(lower), None) => format!("{} (>= {})", name, lower),
        (Some(lower), Some(upper)) => {
            format!("{} (>= {}), {} (<= {})", name, lower, name, upper)
        }
    }
}

/// Dependency field for one relation, or `None` if the instance has none
pub fn format_relation(
    view: &PartitionView<'_>,
    kind: DependencyKind,
    product: &str,
) -> Option<String> {
    let clauses: Vec<String> = view
        .depends_of(kind)
        .map(|dep| format_clause(dep, product))
        .collect();

    if clauses.is_empty() {
        return None;
    }
    Some(format!("{}: {}", kind.field(), clauses.join(", ")))
}

/// Render the control file of one instance
pub fn render(dist: &Distribution, view: &PartitionView<'_>, package: &str, arch: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("Package: {}\n", package));
    out.push_str(&format!("Version: {}\n", dist.full_version()));
    out.push_str(&format!("Maintainer: {}\n", dist.vendor));
    out.push_str(&format!("Architecture: {}\n", arch));
    out.push_str(&format!("Description: {}\n", dist.title));
    out.push_str(&format!(" Copyright: {}\n", dist.copyright));
    for line in &view.descriptions {
        // A blank continuation line is spelled " ." in control files
        if line.text.trim().is_empty() {
            out.push_str(" .\n");
        } else {
            out.push_str(&format!(" {}\n", line.text));
        }
    }

    for kind in DependencyKind::ALL {
        if let Some(field) = format_relation(view, kind, &dist.product) {
            out.push_str(&field);
            out.push('\n');
        }
    }

    for line in view.literals(&LiteralSection::Control) {
        out.push_str(line);
        out.push('\n');
    }

    out
}

/// Write DEBIAN/control
pub fn write(
    debian_dir: &Path,
    dist: &Distribution,
    view: &PartitionView<'_>,
    package: &str,
    arch: &str,
) -> Result<()> {
    let path = debian_dir.join("control");
    debug!("Creating control file {}", path.display());
    filesystem::write_text(&path, "control file", &render(dist, view, package, arch), 0o644)
}
