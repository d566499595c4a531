//! Bounding polygon to pixel box conversion.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A polygon corner as `(x, y)`.
///
/// Objects carry normalized coordinates (0.0 to 1.0), faces carry absolute
/// pixel coordinates. The vision service is not consistent about this.
pub type Vertex = (f64, f64);

/// Axis-aligned box in pixel space, top-left / width / height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct PixelBox {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl PixelBox {
    pub fn new(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Build a box from normalized polygon vertices scaled to an image size.
    ///
    /// Only vertices 0 (top-left), 1 (top-right) and 2 (bottom-right) are
    /// read. Each scaled coordinate is truncated before the subtraction.
    /// Returns `None` if the polygon has fewer than three vertices.
    pub fn from_normalized(vertices: &[Vertex], image_width: u32, image_height: u32) -> Option<Self> {
        let w = f64::from(image_width);
        let h = f64::from(image_height);
        Self::from_corners(vertices, |(x, y)| (x * w, y * h))
    }

    /// Build a box from vertices already expressed in pixels.
    pub fn from_absolute(vertices: &[Vertex]) -> Option<Self> {
        Self::from_corners(vertices, |v| v)
    }

    fn from_corners(vertices: &[Vertex], scale: impl Fn(Vertex) -> Vertex) -> Option<Self> {
        let [top_left, top_right, bottom_right, ..] = vertices else {
            return None;
        };

        let (l, t) = scale(*top_left);
        let (r, _) = scale(*top_right);
        let (_, b) = scale(*bottom_right);

        let left = truncate(l);
        let top = truncate(t);

        Some(Self {
            left,
            top,
            width: truncate(r) - left,
            height: truncate(b) - top,
        })
    }

    /// True if the box has a positive area.
    pub fn is_drawable(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn right(&self) -> i64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> i64 {
        self.top + self.height
    }
}

/// Truncate toward zero, saturating at the i64 range.
fn truncate(value: f64) -> i64 {
    value as i64
}
