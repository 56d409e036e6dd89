// THEORY:
// The `geometry` module holds the small, "dumb" data containers that every other
// stage passes around: a pixel `Point`, a `BoundingBox` describing the visible
// extent of a mask, and the `Corners` view of that box used by the clustering layer.
//
// Key architectural principles:
// 1.  **Image-Relative Coordinates**: Every box is expressed in the pixel space of
//     the image it came from. Masks exported from the same screen capture share
//     that space, which is what makes comparing them meaningful.
// 2.  **Half-Open Extent**: `x1`/`y1` are one past the last visible column/row, so
//     `width = x1 - x0` and a single visible pixel at (3, 4) is `(3, 4, 4, 5)`.
// 3.  **No Behavior Beyond Geometry**: These types know how to measure themselves
//     and nothing else. Grouping decisions live in `proximity_grouper`.

use std::fmt;

/// A 2D pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Largest per-axis difference between two points (L-infinity distance).
    pub fn chebyshev_distance(&self, other: &Point) -> f64 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y)) as f64
    }

    /// Straight-line distance between two points.
    pub fn euclidean_distance(&self, other: &Point) -> f64 {
        let dx = self.x.abs_diff(other.x) as f64;
        let dy = self.y.abs_diff(other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The non-transparent extent of an image, `(x0, y0, x1, y1)`.
/// Invariant: `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl BoundingBox {
    /// Builds a box from two opposite corners, normalizing their order so the
    /// invariant holds regardless of how the caller passed them.
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    /// A box with zero width or height covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// True when `other` lies entirely inside `self` (edges inclusive).
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && self.x1 >= other.x1 && self.y1 >= other.y1
    }

    pub fn corners(&self) -> Corners {
        Corners {
            top_left: Point::new(self.x0, self.y0),
            bottom_right: Point::new(self.x1, self.y1),
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x0, self.y0, self.x1, self.y1)
    }
}

/// The clustering view of a `BoundingBox`: its top-left and bottom-right points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Corners {
    pub top_left: Point,
    pub bottom_right: Point,
}

impl Corners {
    pub fn to_bounding_box(&self) -> BoundingBox {
        BoundingBox::new(
            self.top_left.x,
            self.top_left.y,
            self.bottom_right.x,
            self.bottom_right.y,
        )
    }
}

impl From<BoundingBox> for Corners {
    fn from(bbox: BoundingBox) -> Self {
        bbox.corners()
    }
}
