// src/filesystem/mod.rs

//! Filesystem primitives for staging trees
//!
//! Copying files, creating directories and links with the recorded mode and
//! ownership, writing metadata files, and removing trees.

pub mod path;

use crate::error::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::{PermissionsExt, chown};
use std::path::Path;
use tracing::{debug, warn};

/// Numeric owner of a staged file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ownership {
    pub uid: u32,
    pub gid: u32,
}

impl Ownership {
    /// Look up user and group names in the host databases
    ///
    /// Names that cannot be resolved map to id 0.
    pub fn resolve(user: &str, group: &str) -> Self {
        let uid = nix::unistd::User::from_name(user)
            .ok()
            .flatten()
            .map(|u| u.uid.as_raw())
            .unwrap_or(0);
        let gid = nix::unistd::Group::from_name(group)
            .ok()
            .flatten()
            .map(|g| g.gid.as_raw())
            .unwrap_or(0);
        Self { uid, gid }
    }
}

/// Set mode, then try to set ownership
///
/// Changing ownership needs privileges a packaging user usually lacks;
/// a refusal is logged and ignored.
fn apply_attributes(path: &Path, mode: u32, owner: Ownership) -> Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| {
        Error::IoError(format!(
            "Failed to set permissions on {}: {}",
            path.display(),
            e
        ))
    })?;

    if let Err(e) = chown(path, Some(owner.uid), Some(owner.gid)) {
        debug!(
            "Unable to set ownership {}:{} on {}: {}",
            owner.uid,
            owner.gid,
            path.display(),
            e
        );
    }
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            Error::IoError(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }
    Ok(())
}

/// Copy `src` to `dst`, creating parent directories
pub fn copy_file(dst: &Path, src: &Path, mode: u32, owner: Ownership) -> Result<()> {
    ensure_parent(dst)?;
    if dst.symlink_metadata().is_ok() {
        fs::remove_file(dst)
            .map_err(|e| Error::IoError(format!("Failed to replace {}: {}", dst.display(), e)))?;
    }
    fs::copy(src, dst).map_err(|e| {
        Error::IoError(format!(
            "Unable to copy {} to {}: {}",
            src.display(),
            dst.display(),
            e
        ))
    })?;
    apply_attributes(dst, mode, owner)
}

/// Create a directory (and its parents) with the given mode and owner
pub fn make_directory(path: &Path, mode: u32, owner: Ownership) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| {
        Error::IoError(format!(
            "Unable to create directory {}: {}",
            path.display(),
            e
        ))
    })?;
    apply_attributes(path, mode, owner)
}

/// Create a symbolic link at `link` pointing to `target`
pub fn make_link(link: &Path, target: &str) -> Result<()> {
    ensure_parent(link)?;
    if link.symlink_metadata().is_ok() {
        fs::remove_file(link).map_err(|e| {
            Error::IoError(format!("Failed to replace {}: {}", link.display(), e))
        })?;
    }
    std::os::unix::fs::symlink(target, link).map_err(|e| {
        Error::IoError(format!(
            "Unable to create symlink {} -> {}: {}",
            link.display(),
            target,
            e
        ))
    })
}

/// Create (truncate) a text file, apply `mode`, and write `content`
pub fn write_text(path: &Path, what: &'static str, content: &str, mode: u32) -> Result<()> {
    let mut file = File::create(path).map_err(|e| Error::create(what, path, e))?;
    file.set_permissions(fs::Permissions::from_mode(mode))
        .map_err(|e| Error::create(what, path, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| Error::create(what, path, e))?;
    Ok(())
}

/// Append `content` to an existing text file
pub fn append_text(path: &Path, what: &'static str, content: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| Error::create(what, path, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| Error::create(what, path, e))?;
    Ok(())
}

/// Remove a staging tree; failures are logged, not returned
pub fn remove_tree(path: &Path) {
    if let Err(e) = fs::remove_dir_all(path)
        && path.exists()
    {
        warn!("Failed to remove {}: {}", path.display(), e);
    }
}

/// Remove a single file; failures are logged, not returned
pub fn remove_file(path: &Path) {
    if let Err(e) = fs::remove_file(path)
        && path.exists()
    {
        warn!("Failed to remove {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::MetadataExt;
    use tempfile::TempDir;

    fn current_owner() -> Ownership {
        Ownership {
            uid: nix::unistd::getuid().as_raw(),
            gid: nix::unistd::getgid().as_raw(),
        }
    }

    #[test]
    fn test_unknown_names_resolve_to_zero() {
        let owner = Ownership::resolve("no-such-user-debforge", "no-such-group-debforge");
        assert_eq!(owner, Ownership { uid: 0, gid: 0 });
    }

    #[test]
    fn test_copy_file_sets_mode_and_creates_parents() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.txt");
        fs::write(&src, "payload").unwrap();

        let dst = temp.path().join("stage/usr/bin/tool");
        copy_file(&dst, &src, 0o750, current_owner()).unwrap();

        assert_eq!(fs::read_to_string(&dst).unwrap(), "payload");
        assert_eq!(fs::metadata(&dst).unwrap().mode() & 0o7777, 0o750);
    }

    #[test]
    fn test_copy_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let err = copy_file(
            &temp.path().join("out"),
            &temp.path().join("missing"),
            0o644,
            current_owner(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_make_directory_and_link() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("var/lib/app");
        make_directory(&dir, 0o700, current_owner()).unwrap();
        assert!(dir.is_dir());
        assert_eq!(fs::metadata(&dir).unwrap().mode() & 0o7777, 0o700);

        let link = temp.path().join("usr/bin/app");
        make_link(&link, "/opt/app/bin/app").unwrap();
        assert_eq!(
            fs::read_link(&link).unwrap(),
            Path::new("/opt/app/bin/app")
        );

        // Re-creating replaces the old link
        make_link(&link, "/opt/app/bin/app2").unwrap();
        assert_eq!(
            fs::read_link(&link).unwrap(),
            Path::new("/opt/app/bin/app2")
        );
    }

    #[test]
    fn test_write_and_append_text() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("control");
        write_text(&path, "control file", "Package: a\n", 0o644).unwrap();
        append_text(&path, "control file", "Installed-Size: 4\n").unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Package: a\nInstalled-Size: 4\n"
        );
        assert_eq!(fs::metadata(&path).unwrap().mode() & 0o7777, 0o644);
    }

    #[test]
    fn test_write_text_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing-dir/postinst");
        let err = write_text(&path, "script file", "", 0o755).unwrap_err();
        assert!(matches!(err, Error::CreateError { .. }));
        assert!(err.to_string().contains("postinst"));
    }

    #[test]
    fn test_append_to_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        assert!(append_text(&temp.path().join("nope"), "control file", "x").is_err());
    }
}
