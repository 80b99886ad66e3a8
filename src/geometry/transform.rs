//! Rotation and page-box transforms

use serde::{Deserialize, Serialize};

use super::Rect;

/// Clockwise page rotation from the PDF `/Rotate` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Normalise a raw `/Rotate` value
    ///
    /// Negative and >360 values wrap; anything that is not a multiple of 90
    /// is treated as no rotation.
    pub fn from_degrees(degrees: i64) -> Self {
        match degrees.rem_euclid(360) {
            90 => Self::Deg90,
            180 => Self::Deg180,
            270 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Rotation that undoes this one (`360 - θ`)
    pub fn complement(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg0,
            Self::Deg90 => Self::Deg270,
            Self::Deg180 => Self::Deg180,
            Self::Deg270 => Self::Deg90,
        }
    }

    /// Width and height trade places in upright space
    pub fn swaps_axes(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

/// Per-page geometry context, built once per page and read-only thereafter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub media_box: Rect,
    pub crop_box: Rect,
    pub rotation: Rotation,
}

impl PageGeometry {
    /// Build a context; the crop box defaults to the media box and is
    /// clipped to it
    pub fn new(media_box: Rect, crop_box: Option<Rect>, rotation: Rotation) -> Self {
        let crop_box = crop_box
            .and_then(|crop| crop.intersection(&media_box))
            .filter(|crop| !crop.is_empty())
            .unwrap_or(media_box);
        Self {
            media_box,
            crop_box,
            rotation,
        }
    }

    /// Visible page size after rotation
    pub fn upright_size(&self) -> (f64, f64) {
        let (w, h) = (self.crop_box.width(), self.crop_box.height());
        if self.rotation.swaps_axes() {
            (h, w)
        } else {
            (w, h)
        }
    }

    /// Native point to upright, crop-relative point
    pub fn point_to_upright(&self, x: f64, y: f64) -> (f64, f64) {
        let px = x - self.crop_box.x0;
        let py = y - self.crop_box.y0;
        let (w, h) = (self.crop_box.width(), self.crop_box.height());
        match self.rotation {
            Rotation::Deg0 => (px, py),
            Rotation::Deg90 => (py, w - px),
            Rotation::Deg180 => (w - px, h - py),
            Rotation::Deg270 => (h - py, px),
        }
    }

    /// Upright, crop-relative point back to native
    pub fn point_from_upright(&self, u: f64, v: f64) -> (f64, f64) {
        let (w, h) = (self.crop_box.width(), self.crop_box.height());
        let (px, py) = match self.rotation {
            Rotation::Deg0 => (u, v),
            Rotation::Deg90 => (w - v, u),
            Rotation::Deg180 => (w - u, h - v),
            Rotation::Deg270 => (v, h - u),
        };
        (px + self.crop_box.x0, py + self.crop_box.y0)
    }

    /// Native rectangle to upright space
    pub fn to_upright(&self, rect: &Rect) -> Rect {
        let (ax, ay) = self.point_to_upright(rect.x0, rect.y0);
        let (bx, by) = self.point_to_upright(rect.x1, rect.y1);
        Rect::new(ax, ay, bx, by)
    }

    /// Upright rectangle back to native space
    pub fn from_upright(&self, rect: &Rect) -> Rect {
        let (ax, ay) = self.point_from_upright(rect.x0, rect.y0);
        let (bx, by) = self.point_from_upright(rect.x1, rect.y1);
        Rect::new(ax, ay, bx, by)
    }

    /// Native rectangle to top-down device space at 72 DPI
    ///
    /// In the result `y0` is the top edge.
    pub fn to_device(&self, rect: &Rect) -> Rect {
        let upright = self.to_upright(rect);
        let (_, h) = self.upright_size();
        Rect::new(upright.x0, h - upright.y1, upright.x1, h - upright.y0)
    }

    /// Top-down device rectangle at 72 DPI back to native space
    pub fn from_device(&self, rect: &Rect) -> Rect {
        let (_, h) = self.upright_size();
        let upright = Rect::new(rect.x0, h - rect.y1, rect.x1, h - rect.y0);
        self.from_upright(&upright)
    }
}
