//! Finds the mask images under a root directory.

use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

fn is_png(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("png"))
}

/// Recursively collects every `.png` under `root`, sorted by path so runs are
/// repeatable. Unreadable entries are logged and skipped.
pub fn discover_masks(root: &Path) -> Vec<PathBuf> {
    info!("Gathering .png files under {}.", root.display());
    let files: Vec<PathBuf> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_png(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    info!("Found {} .png files.", files.len());
    files
}
