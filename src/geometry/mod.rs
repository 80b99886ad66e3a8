//! Page geometry
//!
//! Axis-aligned rectangles in PDF user space, QuadPoints decoding, and the
//! transforms between a page's native coordinate space and the upright,
//! crop-relative space used by MuPDF.
//!
//! # Coordinate spaces
//!
//! - **native**: PDF user space, bottom-up, as stored in annotation arrays
//! - **upright**: rotated so the page reads upright, origin at the crop box
//!   lower-left corner, bottom-up
//! - **device**: upright with the Y axis flipped (top-down), 72 points per
//!   inch, as produced by MuPDF's structured text

pub mod matcher;
mod transform;

pub use matcher::{match_quad, match_quads, MatchConfig, RegionMatch};
pub use transform::{PageGeometry, Rotation};

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, `(x0, y0)` lower corner and `(x1, y1)` upper corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    /// Create a rectangle with normalised corners
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Rectangle from a PDF `[llx lly urx ury]` array
    ///
    /// Returns `None` unless the slice holds exactly four finite numbers.
    pub fn from_array(values: &[f64]) -> Option<Self> {
        match values {
            [x0, y0, x1, y1] if values.iter().all(|v| v.is_finite()) => {
                Some(Self::new(*x0, *y0, *x1, *y1))
            }
            _ => None,
        }
    }

    /// Bounding box of a set of points
    pub fn from_points(points: &[(f64, f64)]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut rect = Self {
            x0: first.0,
            y0: first.1,
            x1: first.0,
            y1: first.1,
        };
        for &(x, y) in rest {
            rect.x0 = rect.x0.min(x);
            rect.y0 = rect.y0.min(y);
            rect.x1 = rect.x1.max(x);
            rect.y1 = rect.y1.max(y);
        }
        Some(rect)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Corners are finite and ordered
    pub fn is_valid(&self) -> bool {
        [self.x0, self.y0, self.x1, self.y1]
            .iter()
            .all(|v| v.is_finite())
            && self.x0 <= self.x1
            && self.y0 <= self.y1
    }

    /// Encloses no area
    pub fn is_empty(&self) -> bool {
        !self.is_valid() || self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Closed-interval overlap test (touching edges count)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        })
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Shrink the height by `fraction` of itself, centred vertically
    ///
    /// `fraction = 0.6` keeps the middle 40% band.
    pub fn vertical_band(&self, fraction: f64) -> Rect {
        let inset = self.height() * fraction / 2.0;
        Rect {
            x0: self.x0,
            y0: self.y0 + inset,
            x1: self.x1,
            y1: self.y1 - inset,
        }
    }
}

/// Decode a QuadPoints array into one rectangle per quadrilateral
///
/// Each group of eight numbers is four `(x, y)` corners; the rectangle is
/// their min/max extent. A trailing partial group is ignored, so fewer than
/// eight numbers decode to nothing.
pub fn quad_rects(values: &[f64]) -> Vec<Rect> {
    values
        .chunks_exact(8)
        .filter_map(|quad| {
            let points: Vec<(f64, f64)> = quad.chunks_exact(2).map(|p| (p[0], p[1])).collect();
            Rect::from_points(&points)
        })
        .collect()
}
