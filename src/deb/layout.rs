// src/deb/layout.rs

//! Staging tree population
//!
//! Each file entry of the instance is copied, created or linked at its
//! destination under the staging root.

use super::scripts::INIT_DIR;
use crate::distribution::{FileKind, PartitionView};
use crate::error::Result;
use crate::filesystem::{self, Ownership, path};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where an entry lands inside the staging root
pub fn destination(stage_root: &Path, kind: FileKind, dst: &str) -> Result<PathBuf> {
    match kind {
        FileKind::Service => {
            let name = path::sanitize_filename(dst)?;
            path::stage_join(stage_root, format!("{}/{}", INIT_DIR, name))
        }
        _ => path::stage_join(stage_root, dst),
    }
}

/// Populate `stage_root` with the files of one instance
///
/// Returns the number of entries materialized.
pub fn materialize(stage_root: &Path, view: &PartitionView<'_>) -> Result<usize> {
    for file in &view.files {
        let target = destination(stage_root, file.kind, &file.dst)?;

        match file.kind {
            FileKind::Regular | FileKind::Config | FileKind::Service => {
                let owner = Ownership::resolve(&file.user, &file.group);
                debug!("{} -> {}", file.src, target.display());
                filesystem::copy_file(&target, Path::new(&file.src), file.mode, owner)?;
            }
            FileKind::Directory => {
                let owner = Ownership::resolve(&file.user, &file.group);
                debug!("Directory {}", target.display());
                filesystem::make_directory(&target, file.mode, owner)?;
            }
            FileKind::Symlink => {
                debug!("{} -> {}", file.src, target.display());
                filesystem::make_link(&target, &file.src)?;
            }
        }
    }

    Ok(view.files.len())
}
