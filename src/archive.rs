// THEORY:
// The `archive` module packages a run into a single `.vas` file: a zip holding the
// cropped masks at their relative paths plus `script.asl` and `structure.xml`.
//
// The archive is written to a `.partial` sibling first and renamed into place only
// after the zip is finalized. A run that fails here leaves no `.vas` behind.

use crate::error::{Result, RunError};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// One file to place in the archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// `/`-separated path inside the archive.
    pub name: String,
    pub contents: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

fn write_entries(path: &Path, entries: &[ArchiveEntry]) -> Result<()> {
    let io_error = |source| RunError::Io {
        path: path.to_path_buf(),
        source,
    };
    let zip_error = |source| RunError::Archive {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in entries {
        zip.start_file(entry.name.as_str(), options).map_err(zip_error)?;
        zip.write_all(&entry.contents).map_err(io_error)?;
        info!("Added to archive: {}", entry.name);
    }

    zip.finish().map_err(zip_error)?;
    Ok(())
}

/// Writes `entries` to a zip at `path`, replacing any existing file only on success.
pub fn write_archive(path: &Path, entries: &[ArchiveEntry]) -> Result<()> {
    let partial = partial_path(path);

    if let Err(e) = write_entries(&partial, entries) {
        if fs::remove_file(&partial).is_err() {
            warn!("Could not remove {}", partial.display());
        }
        return Err(e);
    }

    fs::rename(&partial, path).map_err(|source| RunError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("VAS archive created: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn writes_all_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.vas");
        let entries = vec![
            ArchiveEntry::new("boss/a.png", vec![1u8, 2, 3]),
            ArchiveEntry::new("script.asl", "// hi"),
        ];

        write_archive(&path, &entries).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);
        let mut script = String::new();
        archive
            .by_name("script.asl")
            .unwrap()
            .read_to_string(&mut script)
            .unwrap();
        assert_eq!(script, "// hi");
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn failed_write_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("run.vas");

        assert!(write_archive(&path, &[ArchiveEntry::new("x", "y")]).is_err());
        assert!(!path.exists());
        assert!(!partial_path(&path).exists());
    }
}
