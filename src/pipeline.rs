// THEORY:
// The `pipeline` module is the top-level API of the architect. It runs the whole
// stack for one target directory and either commits a finished `.vas` archive or
// reports why it could not.
//
// Stages:
// 1.  **Discovery**: collect every `.png` under the target directory.
// 2.  **Grouping**: extract, group, consolidate, crop and name the masks.
// 3.  **Descriptor**: build WatchZones and render `structure.xml`.
// 4.  **Script**: render the `script.asl` skeleton from the mask names.
// 5.  **Packaging**: encode the crops and write the archive.
//
// Per-image trouble is absorbed by stage 2. Only an empty result, or a failure
// while producing the output files, aborts the run.

use crate::archive::{ArchiveEntry, write_archive};
use crate::config::ArchitectConfig;
use crate::core_modules::grouping_orchestrator::{GroupingOrchestrator, SkippedImage};
use crate::core_modules::image_helper::image_helper;
use crate::descriptor::{build_watch_zones, collect_mask_names, relative_path, render_structure};
use crate::discovery::discover_masks;
use crate::error::{Result, RunError};
use crate::script::create_script;
use std::path::{Path, PathBuf};
use tracing::info;

// Re-export key data structures for the public API.
pub use crate::core_modules::grouping_orchestrator::{GroupingReport, ProcessedImage};
pub use crate::descriptor::WatchZone;

/// What a successful run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub archive_path: PathBuf,
    pub watch_zones: Vec<WatchZone>,
    pub mask_names: Vec<String>,
    pub skipped: Vec<SkippedImage>,
}

impl RunSummary {
    /// The operator-facing completion message.
    pub fn message(&self) -> String {
        let mut message = String::from("VAS archive created successfully.");
        if !self.skipped.is_empty() {
            message.push_str("\n\nNote: The following files were not processed:");
            for skipped in &self.skipped {
                message.push_str(&format!("\n{}", skipped.path.display()));
            }
        }
        message
    }
}

/// Builds VAS archives from directories of masks.
#[derive(Debug, Clone, Default)]
pub struct VasArchitect {
    config: ArchitectConfig,
}

impl VasArchitect {
    pub fn new(config: ArchitectConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ArchitectConfig {
        &self.config
    }

    /// Default archive location: `<root>/<root name>.<ext>`.
    pub fn default_archive_path(&self, root: &Path) -> PathBuf {
        let name = root.file_name().unwrap_or_default().to_string_lossy();
        root.join(format!("{}.{}", name, self.config.output.archive_extension))
    }

    /// Runs every stage for `root`, writing the archive to `output` or the default path.
    pub fn run(&self, root: &Path, output: Option<&Path>) -> Result<RunSummary> {
        let root = root.canonicalize().map_err(|source| RunError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        let archive_path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_archive_path(&root));

        // --- 1. Discovery ---
        let files = discover_masks(&root);
        if files.is_empty() {
            return Err(RunError::NoImagesFound(root));
        }

        // --- 2. Grouping ---
        let report = GroupingOrchestrator::new(self.config.grouping).run(&files);
        if report.is_empty() {
            return Err(RunError::NoValidImages);
        }

        // --- 3. Descriptor ---
        info!("Image files processed. Generating structure.");
        let game_name = root.file_name().unwrap_or_default().to_string_lossy();
        let watch_zones = build_watch_zones(&report.processed, &root)?;
        let mask_names = collect_mask_names(&watch_zones);
        if mask_names.is_empty() {
            return Err(RunError::NoMasks);
        }
        let structure = render_structure(&game_name, &self.config.profile, &watch_zones);

        // --- 4. Script ---
        info!("Completed structure. Generating script.");
        let script = create_script(&mask_names);

        // --- 5. Packaging ---
        info!("Completed script. Generating VAS archive.");
        let mut entries = Vec::with_capacity(report.processed.len() + 2);
        for image in &report.processed {
            let png = image_helper::encode_png(&image.cropped).map_err(|source| {
                RunError::Encode {
                    path: image.output_path.clone(),
                    source,
                }
            })?;
            entries.push(ArchiveEntry::new(relative_path(&image.output_path, &root)?, png));
        }
        entries.push(ArchiveEntry::new(self.config.output.script_name.as_str(), script));
        entries.push(ArchiveEntry::new(self.config.output.structure_name.as_str(), structure));
        write_archive(&archive_path, &entries)?;

        Ok(RunSummary {
            archive_path,
            watch_zones,
            mask_names,
            skipped: report.skipped,
        })
    }
}
