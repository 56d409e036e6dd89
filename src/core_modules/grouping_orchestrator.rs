// THEORY:
// The `GroupingOrchestrator` runs the grouping stack over every mask of a run and
// turns it into two lists: masks ready for packaging and masks that were skipped.
//
// Key architectural principles & algorithm steps:
// 1.  **Corner Extraction**: Every file is decoded once to find its visible bounding
//     box. Unreadable or fully transparent files are recorded as skipped; the rest
//     are bucketed by directory in input order.
// 2.  **Proximity Grouping**: Each directory is grouped on its own by the
//     `proximity_grouper`.
// 3.  **Consolidation**: Every group's boxes are replaced by their minimum bounding
//     rectangle, so all members of a WatchZone share one exact box.
// 4.  **Crop & Name**: In original input order, each surviving file is re-opened,
//     cropped to its consolidated box and given a unique mask name.
// 5.  **Explicit Outcomes**: Failures never escape. Each file ends up as either
//     `ImageOutcome::Processed` or `ImageOutcome::Skipped` with the reason attached.
//     Whether an empty result is fatal is the caller's call.
//
// All per-run state (corner map, group map, naming scope) lives in a `RunContext`
// owned by a single `run` call. Nothing is carried between runs.

use crate::config::GroupingConfig;
use crate::core_modules::corner_extractor::{ImageHandle, extract_bounding_box, load_rgba};
use crate::core_modules::geometry::BoundingBox;
use crate::core_modules::image_helper::image_helper;
use crate::core_modules::mbr::minimum_bounding_rectangle;
use crate::core_modules::naming::UniqueNamer;
use crate::core_modules::proximity_grouper::{ClusterKey, proximity_grouper};
use crate::error::{GroupError, ImageError};
use image::RgbaImage;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// A mask that made it through grouping and cropping.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    /// The file the mask was read from.
    pub source: ImageHandle,
    /// Where the mask lives after renaming: the source path with a unique stem.
    pub output_path: PathBuf,
    /// The consolidated bounding box shared by the whole group.
    pub bbox: BoundingBox,
    pub cropped: RgbaImage,
}

impl ProcessedImage {
    /// The unique mask name (the output file's stem).
    pub fn mask_name(&self) -> String {
        self.output_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn directory(&self) -> &Path {
        self.source.directory()
    }
}

/// A mask that was left out of the run, and why.
#[derive(Debug)]
pub struct SkippedImage {
    pub path: PathBuf,
    pub reason: ImageError,
}

/// The per-file result of a run.
#[derive(Debug)]
pub enum ImageOutcome {
    Processed(ProcessedImage),
    Skipped(SkippedImage),
}

/// Everything a run produced, split into usable and skipped masks.
#[derive(Debug, Default)]
pub struct GroupingReport {
    pub processed: Vec<ProcessedImage>,
    pub skipped: Vec<SkippedImage>,
}

impl GroupingReport {
    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}

impl FromIterator<ImageOutcome> for GroupingReport {
    fn from_iter<I: IntoIterator<Item = ImageOutcome>>(iter: I) -> Self {
        let mut report = GroupingReport::default();
        for outcome in iter {
            match outcome {
                ImageOutcome::Processed(image) => report.processed.push(image),
                ImageOutcome::Skipped(skipped) => report.skipped.push(skipped),
            }
        }
        report
    }
}

/// Mutable state for one run, threaded through each stage.
struct RunContext {
    images: Vec<ImageHandle>,
    /// Per-image box: the extracted one, then the consolidated one.
    boxes: Vec<Option<BoundingBox>>,
    /// First failure recorded for each image, if any.
    failures: Vec<Option<ImageError>>,
    directories: IndexMap<PathBuf, Vec<usize>>,
    groups: IndexMap<ClusterKey, Vec<usize>>,
    mask_names: UniqueNamer,
}

impl RunContext {
    fn new(files: &[PathBuf]) -> Self {
        let images: Vec<ImageHandle> = files.iter().map(ImageHandle::new).collect();
        let count = images.len();
        Self {
            images,
            boxes: vec![None; count],
            failures: (0..count).map(|_| None).collect(),
            directories: IndexMap::new(),
            groups: IndexMap::new(),
            mask_names: UniqueNamer::new(),
        }
    }

    fn fail(&mut self, index: usize, reason: ImageError) {
        self.boxes[index] = None;
        if self.failures[index].is_none() {
            self.failures[index] = Some(reason);
        }
    }
}

/// Coordinates corner extraction, grouping, consolidation and cropping for a run.
#[derive(Debug, Clone, Default)]
pub struct GroupingOrchestrator {
    config: GroupingConfig,
}

impl GroupingOrchestrator {
    pub fn new(config: GroupingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GroupingConfig {
        &self.config
    }

    /// Runs the full grouping stack over `files`.
    pub fn run(&self, files: &[PathBuf]) -> GroupingReport {
        let mut context = RunContext::new(files);

        // --- 1. Corner Extraction ---
        self.extract_corners(&mut context);

        // --- 2. Proximity Grouping ---
        self.group_directories(&mut context);

        // --- 3. Consolidation ---
        info!("Completed image grouping. Updating bounding boxes.");
        self.consolidate_groups(&mut context);

        // --- 4. Crop & Name ---
        let report: GroupingReport = self.crop_all(&mut context).into_iter().collect();
        info!(
            "Image processing completed: {} processed, {} skipped.",
            report.processed.len(),
            report.skipped.len()
        );
        report
    }

    fn extract_corners(&self, context: &mut RunContext) {
        for index in 0..context.images.len() {
            let handle = &context.images[index];
            match extract_bounding_box(handle) {
                Ok(Some(bbox)) => {
                    let directory = handle.directory().to_path_buf();
                    context.boxes[index] = Some(bbox);
                    context.directories.entry(directory).or_default().push(index);
                }
                Ok(None) => {
                    warn!("No non-transparent area found in {}", handle.path().display());
                    context.fail(index, ImageError::NoContent);
                }
                Err(e) => {
                    error!("Error while accessing {}: {}", handle.path().display(), e);
                    context.fail(index, e);
                }
            }
        }
    }

    fn group_directories(&self, context: &mut RunContext) {
        for (directory, indices) in &context.directories {
            info!(
                "Processing: {}",
                directory.file_name().unwrap_or_default().to_string_lossy()
            );
            let members: Vec<_> = indices
                .iter()
                .filter_map(|&i| context.boxes[i].map(|bbox| (i, bbox.corners())))
                .collect();

            let groups = proximity_grouper::group_directory(directory, &members, &self.config);
            for (key, group) in groups {
                info!("Group {} holds {} images.", key, group.len());
                context.groups.insert(key, group);
            }
        }
    }

    fn consolidate_groups(&self, context: &mut RunContext) {
        let groups = std::mem::take(&mut context.groups);
        for (key, members) in &groups {
            match consolidate(key, members, &context.boxes) {
                Ok(mbr) => {
                    for &index in members {
                        context.boxes[index] = Some(mbr);
                    }
                }
                Err(e) => {
                    error!("Error updating bounding boxes for group {}: {}", key, e);
                    for &index in members {
                        context.fail(index, ImageError::Group(e.clone()));
                    }
                }
            }
        }
        context.groups = groups;
    }

    fn crop_all(&self, context: &mut RunContext) -> Vec<ImageOutcome> {
        let mut outcomes = Vec::with_capacity(context.images.len());

        for index in 0..context.images.len() {
            let handle = context.images[index].clone();
            let result = match (context.failures[index].take(), context.boxes[index]) {
                (Some(reason), _) => Err(reason),
                (None, None) => Err(ImageError::NoContent),
                (None, Some(bbox)) => crop_image(&handle, &bbox).map(|cropped| (bbox, cropped)),
            };

            let outcome = match result {
                Ok((bbox, cropped)) => {
                    let name = context.mask_names.allocate(&handle.stem());
                    let output_path = renamed_path(handle.path(), &name);
                    info!("Image processed: {}", name);
                    ImageOutcome::Processed(ProcessedImage {
                        source: handle,
                        output_path,
                        bbox,
                        cropped,
                    })
                }
                Err(reason) => {
                    warn!("Skipping image {}: {}", handle.path().display(), reason);
                    ImageOutcome::Skipped(SkippedImage {
                        path: handle.path().to_path_buf(),
                        reason,
                    })
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }
}

/// Computes a group's MBR from the boxes recorded for its members.
fn consolidate(
    key: &ClusterKey,
    members: &[usize],
    boxes: &[Option<BoundingBox>],
) -> Result<BoundingBox, GroupError> {
    let group_boxes = members
        .iter()
        .map(|&i| boxes.get(i).copied().flatten().ok_or(GroupError::MissingCorners(i)))
        .collect::<Result<Vec<_>, _>>()?;
    minimum_bounding_rectangle(&group_boxes).ok_or_else(|| GroupError::EmptyCluster(key.to_string()))
}

/// Re-opens a mask and cuts out its consolidated box.
fn crop_image(handle: &ImageHandle, bbox: &BoundingBox) -> Result<RgbaImage, ImageError> {
    let image = load_rgba(handle)?;
    image_helper::crop(&image, bbox)
}

/// Replaces the stem of `path` with `name`, keeping its extension.
fn renamed_path(path: &Path, name: &str) -> PathBuf {
    match path.extension() {
        Some(ext) => path.with_file_name(format!("{}.{}", name, ext.to_string_lossy())),
        None => path.with_file_name(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::fs;

    /// Writes a `size`x`size` transparent PNG with an opaque rectangle at `bbox`.
    fn write_mask(path: &Path, size: u32, bbox: BoundingBox) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut image = RgbaImage::new(size, size);
        for x in bbox.x0..bbox.x1 {
            for y in bbox.y0..bbox.y1 {
                image.put_pixel(x, y, Rgba([200, 40, 40, 255]));
            }
        }
        image.save(path).expect("Error Saving File.");
    }

    #[test]
    fn singleton_keeps_its_own_box() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/only.png");
        write_mask(&path, 64, BoundingBox::new(10, 10, 50, 50));

        let report = GroupingOrchestrator::default().run(&[path]);
        assert_eq!(report.processed.len(), 1);
        assert_eq!(report.processed[0].bbox, BoundingBox::new(10, 10, 50, 50));
        assert_eq!(report.processed[0].cropped.dimensions(), (40, 40));
    }

    #[test]
    fn close_pair_shares_consolidated_box() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("zone/a.png");
        let b = dir.path().join("zone/b.png");
        write_mask(&a, 64, BoundingBox::new(0, 0, 40, 40));
        write_mask(&b, 64, BoundingBox::new(5, 5, 45, 45));

        let report = GroupingOrchestrator::default().run(&[a, b]);
        let boxes: Vec<_> = report.processed.iter().map(|p| p.bbox).collect();
        assert_eq!(boxes, vec![BoundingBox::new(0, 0, 45, 45); 2]);
    }

    #[test]
    fn distant_pair_keeps_separate_boxes() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("zone/a.png");
        let b = dir.path().join("zone/b.png");
        write_mask(&a, 128, BoundingBox::new(0, 0, 40, 40));
        write_mask(&b, 128, BoundingBox::new(50, 50, 90, 90));

        let report = GroupingOrchestrator::default().run(&[a, b]);
        assert_eq!(report.processed[0].bbox, BoundingBox::new(0, 0, 40, 40));
        assert_eq!(report.processed[1].bbox, BoundingBox::new(50, 50, 90, 90));
    }

    #[test]
    fn directories_never_merge() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("left/a.png");
        let b = dir.path().join("right/b.png");
        write_mask(&a, 64, BoundingBox::new(0, 0, 40, 40));
        write_mask(&b, 64, BoundingBox::new(1, 1, 41, 41));

        let report = GroupingOrchestrator::default().run(&[a, b]);
        assert_eq!(report.processed[0].bbox, BoundingBox::new(0, 0, 40, 40));
        assert_eq!(report.processed[1].bbox, BoundingBox::new(1, 1, 41, 41));
    }

    #[test]
    fn transparent_and_broken_files_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("zone/good.png");
        let blank = dir.path().join("zone/blank.png");
        let broken = dir.path().join("zone/broken.png");
        write_mask(&good, 32, BoundingBox::new(2, 2, 12, 12));
        RgbaImage::new(32, 32).save(&blank).unwrap();
        fs::write(&broken, b"garbage").unwrap();

        let report = GroupingOrchestrator::default().run(&[good, blank.clone(), broken.clone()]);
        assert_eq!(report.processed.len(), 1);
        let skipped: Vec<_> = report.skipped.iter().map(|s| s.path.clone()).collect();
        assert_eq!(skipped, vec![blank, broken]);
        assert!(matches!(report.skipped[0].reason, ImageError::NoContent));
    }

    #[test]
    fn duplicate_stems_are_renamed_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("one/boss.png");
        let b = dir.path().join("two/boss.png");
        let c = dir.path().join("three/boss.png");
        for path in [&a, &b, &c] {
            write_mask(path, 16, BoundingBox::new(1, 1, 5, 5));
        }

        let report = GroupingOrchestrator::default().run(&[a, b.clone(), c]);
        let names: Vec<_> = report.processed.iter().map(|p| p.mask_name()).collect();
        assert_eq!(names, vec!["boss", "boss_1", "boss_2"]);
        assert_eq!(report.processed[1].output_path, dir.path().join("two/boss_1.png"));
        assert_eq!(report.processed[1].source.path(), b.as_path());
    }

    #[test]
    fn empty_input_gives_empty_report() {
        let report = GroupingOrchestrator::default().run(&[]);
        assert!(report.is_empty());
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn consolidate_reports_missing_corners() {
        let key = ClusterKey {
            top_left: 0,
            bottom_right: 0,
            directory: PathBuf::from("d"),
        };
        let boxes = vec![Some(BoundingBox::new(0, 0, 1, 1)), None];
        assert!(matches!(
            consolidate(&key, &[0, 1], &boxes),
            Err(GroupError::MissingCorners(1))
        ));
        assert!(matches!(
            consolidate(&key, &[], &boxes),
            Err(GroupError::EmptyCluster(_))
        ));
    }
}
