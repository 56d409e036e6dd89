// THEORY:
// Once masks are grouped, each group must watch exactly one region of the screen.
// The minimum bounding rectangle (MBR) of the group's boxes is the smallest region
// that still shows every mask in full.

use crate::core_modules::geometry::BoundingBox;
use tracing::info;

/// Computes `(min x0, min y0, max x1, max y1)` over `boxes`.
/// Returns `None` only for an empty slice.
pub fn minimum_bounding_rectangle(boxes: &[BoundingBox]) -> Option<BoundingBox> {
    let first = boxes.first()?;
    let mbr = boxes.iter().skip(1).fold(*first, |acc, b| BoundingBox {
        x0: acc.x0.min(b.x0),
        y0: acc.y0.min(b.y0),
        x1: acc.x1.max(b.x1),
        y1: acc.y1.max(b.y1),
    });
    info!("Calculated MBR: {}", mbr);
    Some(mbr)
}
