// src/deb/conffiles.rs

//! DEBIAN/conffiles writer

use super::scripts::INIT_DIR;
use crate::distribution::{FileKind, PartitionView};
use crate::error::Result;
use crate::filesystem;
use std::path::Path;
use tracing::debug;

/// Render the conffiles list: config destinations and init script paths
pub fn render(view: &PartitionView<'_>) -> String {
    let mut out = String::new();
    for file in &view.files {
        match file.kind {
            FileKind::Config => {
                out.push_str(&file.dst);
                out.push('\n');
            }
            FileKind::Service => {
                out.push_str(&format!("{}/{}\n", INIT_DIR, file.dst));
            }
            _ => {}
        }
    }
    out
}

/// Write DEBIAN/conffiles, even when empty
pub fn write(debian_dir: &Path, view: &PartitionView<'_>) -> Result<()> {
    let path = debian_dir.join("conffiles");
    debug!("Creating conffiles {}", path.display());
    filesystem::write_text(&path, "conffiles", &render(view), 0o644)
}
