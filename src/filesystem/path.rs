// src/filesystem/path.rs

//! Path sanitization for package destinations
//!
//! Destination paths come from the distribution descriptor. They are
//! package-absolute (`/usr/bin/foo`) and must land inside the staging tree.

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Turn a package-absolute path into a relative one
///
/// Leading slashes and `.` components are dropped; `..` components are
/// rejected.
///
/// # Examples
///
/// ```
/// use debforge::filesystem::path::sanitize_path;
/// use std::path::PathBuf;
///
/// assert_eq!(sanitize_path("/usr/bin/foo").unwrap(), PathBuf::from("usr/bin/foo"));
/// assert!(sanitize_path("usr/../../etc/passwd").is_err());
/// ```
pub fn sanitize_path(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();
    let relative = path_str.trim_start_matches('/');

    let mut normalized = PathBuf::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(c) => normalized.push(c),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(Error::PathError(format!(
                    "{} escapes the package root",
                    path_str
                )));
            }
            Component::Prefix(_) | Component::RootDir => {}
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(Error::PathError(format!(
            "'{}' is empty after sanitization",
            path_str
        )));
    }

    Ok(normalized)
}

/// Join a staging root with a package-absolute path
pub fn stage_join(root: impl AsRef<Path>, path: impl AsRef<Path>) -> Result<PathBuf> {
    Ok(root.as_ref().join(sanitize_path(path)?))
}

/// Validate a single file name (no separators, not `.` or `..`)
pub fn sanitize_filename(name: &str) -> Result<&str> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(Error::PathError(format!("invalid file name: '{}'", name)));
    }
    Ok(name)
}
