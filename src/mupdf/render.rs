//! Page rasterisation

use image::RgbImage;
use mupdf::{Colorspace, Matrix, Pixmap};
use tracing::debug;

use super::SafeDocument;
use crate::error::{ExtractError, Result};

impl SafeDocument {
    /// Render a page at `dpi` with annotations drawn
    pub fn render(&self, page: usize, dpi: f64) -> Result<RgbImage> {
        let scale = (dpi / 72.0) as f32;
        self.with_page(page, |p| {
            let matrix = Matrix::new_scale(scale, scale);
            let colorspace = Colorspace::device_rgb();
            let pixmap = p
                .to_pixmap(&matrix, &colorspace, false, true)
                .map_err(|e| ExtractError::Render(e.to_string()))?;
            let image = pixmap_to_rgb(&pixmap)?;
            debug!(page, dpi, width = image.width(), height = image.height(), "rendered page");
            Ok(image)
        })
    }
}

/// Copy pixmap samples into an RGB buffer, dropping any alpha channel
pub fn pixmap_to_rgb(pixmap: &Pixmap) -> Result<RgbImage> {
    samples_to_rgb(
        pixmap.samples(),
        pixmap.width() as u32,
        pixmap.height() as u32,
        pixmap.n() as usize,
    )
}

/// `n` interleaved components per pixel; fewer than three is gray
fn samples_to_rgb(samples: &[u8], width: u32, height: u32, n: usize) -> Result<RgbImage> {
    let (columns, rows) = (width as usize, height as usize);

    let mut rgb = Vec::with_capacity(columns * rows * 3);
    for y in 0..rows {
        for x in 0..columns {
            let offset = (y * columns + x) * n;
            if n < 3 {
                // Gray: replicate
                let v = samples.get(offset).copied().unwrap_or(0);
                rgb.extend_from_slice(&[v, v, v]);
            } else {
                let r = samples.get(offset).copied().unwrap_or(0);
                let g = samples.get(offset + 1).copied().unwrap_or(0);
                let b = samples.get(offset + 2).copied().unwrap_or(0);
                rgb.extend_from_slice(&[r, g, b]);
            }
        }
    }

    RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| ExtractError::Render("Failed to create image buffer".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_samples_drop_alpha() {
        let samples = [10, 20, 30, 255, 40, 50, 60, 128];
        let image = samples_to_rgb(&samples, 2, 1, 4).unwrap();
        assert_eq!(image.get_pixel(0, 0), &Rgb([10, 20, 30]));
        assert_eq!(image.get_pixel(1, 0), &Rgb([40, 50, 60]));
    }

    #[test]
    fn test_gray_samples_replicate() {
        let image = samples_to_rgb(&[7, 9], 1, 2, 1).unwrap();
        assert_eq!(image.get_pixel(0, 1), &Rgb([9, 9, 9]));
    }
}
