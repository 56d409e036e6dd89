// THEORY:
// The `corner_extractor` is the entry point of the grouping stack. For a single
// mask image it answers one question: "which rectangle of this image is actually
// visible?" Everything downstream (clustering, consolidation, cropping) works on
// that rectangle rather than on pixels.
//
// Key architectural principles:
// 1.  **Alpha Normalization**: Every image is converted to RGBA8 before scanning.
//     Images without an alpha channel come out fully opaque, so their bounding box
//     is simply the full image extent.
// 2.  **Empty Is Not An Error**: A mask with no visible pixel yields `None`. The
//     caller decides to skip it; nothing here aborts a run.
// 3.  **Scoped I/O**: The file is opened, decoded and released inside `load_rgba`.
//     No handle outlives the call.

use crate::core_modules::geometry::BoundingBox;
use crate::error::ImageError;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An opaque reference to a source mask file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageHandle {
    path: PathBuf,
}

impl ImageHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The containing directory. Clustering never crosses this boundary.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// File name without its extension, used as the base for mask names.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Decodes an image from disk and normalizes it to RGBA8.
pub fn load_rgba(handle: &ImageHandle) -> Result<RgbaImage, ImageError> {
    let image = image::open(handle.path())?;
    if !image.color().has_alpha() {
        info!(
            "Converting {} from {:?} to RGBA.",
            handle.stem(),
            image.color()
        );
    }
    Ok(image.to_rgba8())
}

/// Finds the tight box around every pixel whose alpha is non-zero.
/// Returns `None` when the image is fully transparent.
pub fn find_content_bounds(image: &RgbaImage) -> Option<BoundingBox> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut found = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        found = true;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    // Right and bottom edges are exclusive.
    found.then(|| BoundingBox::new(min_x, min_y, max_x + 1, max_y + 1))
}

/// Loads `handle` and computes its visible bounding box.
pub fn extract_bounding_box(handle: &ImageHandle) -> Result<Option<BoundingBox>, ImageError> {
    let image = load_rgba(handle)?;
    let bounds = find_content_bounds(&image);
    match &bounds {
        Some(bbox) => {
            let corners = bbox.corners();
            info!(
                "{}: tl: {}, br: {}, dir: {}",
                handle.stem(),
                corners.top_left,
                corners.bottom_right,
                handle.directory().display()
            );
        }
        None => debug!("{}: fully transparent", handle.stem()),
    }
    Ok(bounds)
}
