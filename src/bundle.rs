// src/bundle.rs

//! `.deb.tgz` container holding every instance archive of a distribution

use crate::error::{Error, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::path::Path;
use std::time::UNIX_EPOCH;
use tar::{Builder as TarBuilder, Header};
use tracing::debug;

/// Write `archives` into a gzip-compressed tar at `output`
///
/// Entries are stored under their file names, owned by root, mode 0644.
pub fn create_bundle(output: &Path, archives: &[impl AsRef<Path>]) -> Result<()> {
    let file = File::create(output).map_err(|e| Error::create("bundle", output, e))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut tar = TarBuilder::new(encoder);

    for archive in archives {
        let archive = archive.as_ref();
        let name = archive
            .file_name()
            .ok_or_else(|| Error::PathError(format!("{} has no file name", archive.display())))?;

        let metadata = fs::metadata(archive)
            .map_err(|e| Error::IoError(format!("Unable to stat {}: {}", archive.display(), e)))?;
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let mut header = Header::new_gnu();
        header.set_size(metadata.len());
        header.set_mode(0o644);
        header.set_uid(0);
        header.set_gid(0);
        header.set_username("root")?;
        header.set_groupname("root")?;
        header.set_mtime(mtime);
        header.set_entry_type(tar::EntryType::Regular);

        debug!("Adding {} to {}", archive.display(), output.display());
        let content = File::open(archive)
            .map_err(|e| Error::IoError(format!("Unable to open {}: {}", archive.display(), e)))?;
        tar.append_data(&mut header, name, content)?;
    }

    let encoder = tar.into_inner()?;
    encoder.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use tar::Archive;
    use tempfile::TempDir;

    #[test]
    fn test_bundle_contains_every_archive() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("hello-1.0.deb");
        let b = temp.path().join("hello-docs-1.0.deb");
        fs::write(&a, b"first").unwrap();
        fs::write(&b, b"second archive").unwrap();

        let output = temp.path().join("hello-1.0.deb.tgz");
        create_bundle(&output, &[&a, &b]).unwrap();

        let mut archive = Archive::new(GzDecoder::new(File::open(&output).unwrap()));
        let mut entries = Vec::new();
        for entry in archive.entries().unwrap() {
            let entry = entry.unwrap();
            let header = entry.header();
            assert_eq!(header.mode().unwrap(), 0o644);
            assert_eq!(header.uid().unwrap(), 0);
            entries.push((
                entry.path().unwrap().to_string_lossy().into_owned(),
                header.size().unwrap(),
            ));
        }
        assert_eq!(
            entries,
            vec![
                ("hello-1.0.deb".to_string(), 5),
                ("hello-docs-1.0.deb".to_string(), 14),
            ]
        );
    }

    #[test]
    fn test_missing_archive_fails() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.deb.tgz");
        let missing = temp.path().join("missing.deb");
        assert!(create_bundle(&output, &[missing]).is_err());
    }
}
