//! Bitmap crops and encoding
//!
//! Cuts annotation regions out of rendered pages and writes them as JPEG or
//! PNG.

use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{imageops, RgbImage};
use tracing::debug;

use crate::config::ImageFormat;
use crate::error::{ExtractError, Result};

/// Pixel rectangle, origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Round two corners to pixels and clip to a `width` x `height` bitmap
    ///
    /// Corners may come in any order. `None` when nothing of the rectangle is
    /// left inside the bitmap.
    pub fn from_corners(corners: [f64; 4], width: u32, height: u32) -> Option<Self> {
        let [ax, ay, bx, by] = corners.map(f64::round);
        let clip = |v: f64, max: u32| v.clamp(0.0, max as f64) as u32;
        let (x0, x1) = (clip(ax.min(bx), width), clip(ax.max(bx), width));
        let (y0, y1) = (clip(ay.min(by), height), clip(ay.max(by), height));

        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

/// Copy a sub-region out of `image`
pub fn crop(image: &RgbImage, rect: PixelRect) -> Result<RgbImage> {
    let fits = rect.width > 0
        && rect.height > 0
        && rect.x.saturating_add(rect.width) <= image.width()
        && rect.y.saturating_add(rect.height) <= image.height();
    if !fits {
        return Err(ExtractError::CropUnsupported(
            [rect.x, rect.y, rect.x.saturating_add(rect.width), rect.y.saturating_add(rect.height)],
            image.width(),
            image.height(),
        ));
    }
    Ok(imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image())
}

/// PNG bytes, as fed to OCR
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)?;
    Ok(buffer)
}

/// Write `image` to `path`; `quality` applies to JPEG only
pub fn write_image(image: &RgbImage, path: &Path, format: ImageFormat, quality: u8) -> Result<()> {
    match format {
        ImageFormat::Jpg => {
            let mut writer = BufWriter::new(File::create(path)?);
            let encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
            image.write_with_encoder(encoder)?;
            writer.flush()?;
        }
        ImageFormat::Png => {
            image.save_with_format(path, image::ImageFormat::Png)?;
        }
    }
    debug!(path = %path.display(), %format, width = image.width(), height = image.height(), "wrote snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 0]))
    }

    #[test]
    fn test_from_corners_normalises_and_clips() {
        let rect = PixelRect::from_corners([10.4, 50.6, -3.0, 20.2], 40, 40).unwrap();
        assert_eq!(rect, PixelRect { x: 0, y: 20, width: 10, height: 20 });
    }

    #[test]
    fn test_from_corners_outside_bitmap() {
        assert_eq!(PixelRect::from_corners([50.0, 50.0, 60.0, 60.0], 40, 40), None);
        // Zero width after rounding
        assert_eq!(PixelRect::from_corners([5.0, 5.0, 5.2, 9.0], 40, 40), None);
    }

    #[test]
    fn test_from_corners_partly_outside_is_clipped() {
        let rect = PixelRect::from_corners([30.0, -10.0, 55.0, 12.0], 40, 40).unwrap();
        assert_eq!(rect, PixelRect { x: 30, y: 0, width: 10, height: 12 });
    }

    #[test]
    fn test_crop_copies_pixels() {
        let image = gradient(20, 10);
        let rect = PixelRect { x: 5, y: 2, width: 4, height: 3 };
        let cropped = crop(&image, rect).unwrap();
        assert_eq!(cropped.dimensions(), (4, 3));
        assert_eq!(cropped.get_pixel(0, 0), &Rgb([5, 2, 0]));
        assert_eq!(cropped.get_pixel(3, 2), &Rgb([8, 4, 0]));
    }

    #[test]
    fn test_crop_rejects_overflow() {
        let image = gradient(20, 10);
        let rect = PixelRect { x: 18, y: 0, width: 4, height: 3 };
        assert!(matches!(crop(&image, rect), Err(ExtractError::CropUnsupported(..))));
    }

    #[test]
    fn test_encode_png_signature() {
        let bytes = encode_png(&gradient(3, 3)).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_write_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let image = gradient(16, 16);

        let jpg = dir.path().join("a.jpg");
        write_image(&image, &jpg, ImageFormat::Jpg, 80).unwrap();
        let decoded = image::open(&jpg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 16));

        let png = dir.path().join("a.png");
        write_image(&image, &png, ImageFormat::Png, 0).unwrap();
        assert_eq!(image::open(&png).unwrap().to_rgb8(), image);
    }
}
