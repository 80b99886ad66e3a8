//! Image annotations
//!
//! A `/Square` annotation marks a page region. The region is mapped into the
//! upright page, scaled to the pre-rendered bitmaps, written to disk and
//! optionally fed to OCR.

use std::path::PathBuf;
use std::sync::Arc;

use image::RgbImage;
use tracing::{debug, warn};

use super::builder::PageContext;
use crate::config::ImageConfig;
use crate::error::Result;
use crate::geometry::{PageGeometry, Rect};
use crate::ocr::OcrProvider;
use crate::raster::{self, PixelRect};

/// What the image path adds to a record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub image_path: Option<String>,
    pub ocr_text: Option<String>,
}

/// Pixel rectangle of a native region inside a `width` x `height` render of
/// the upright page
///
/// The region is clipped to the bitmap; `None` when nothing of it is left,
/// e.g. a zero-area region or one drawn outside the crop box.
pub fn crop_rect(geometry: &PageGeometry, region: &Rect, width: u32, height: u32) -> Option<PixelRect> {
    let device = geometry.to_device(region);
    let (page_width, _) = geometry.upright_size();
    let scale = if page_width > 0.0 { width as f64 / page_width } else { 0.0 };

    PixelRect::from_corners(
        [device.x0, device.y0, device.x1, device.y1].map(|v| v * scale),
        width,
        height,
    )
}

/// `{base}-{page}-x{x}-y{y}.{ext}` from the region's upright lower-left corner
pub fn snapshot_file_name(images: &ImageConfig, page: usize, upright: &Rect) -> String {
    format!(
        "{}-{}-x{}-y{}.{}",
        images.base_name,
        page,
        upright.x0 as i64,
        upright.y0 as i64,
        images.format.extension()
    )
}

impl Snapshot {
    /// Crop, write and recognise one region
    ///
    /// Writing happens only when [`ImageConfig::write`] is set and a page
    /// bitmap was rendered; OCR only when a provider and an OCR bitmap exist.
    /// A region with no pixels on the page yields an empty snapshot.
    pub async fn take(
        page: &PageContext,
        geometry: &PageGeometry,
        region: &Rect,
        images: &ImageConfig,
        ocr: Option<&Arc<dyn OcrProvider>>,
    ) -> Result<Self> {
        let mut snapshot = Snapshot::default();

        if let (true, Some(dir), Some(bitmap)) = (images.write, &images.output_dir, &page.bitmap) {
            let Some(pixels) = crop_rect(geometry, region, bitmap.width(), bitmap.height()) else {
                warn!(page = page.index + 1, ?region, "image region has no pixels on the page, skipping");
                return Ok(snapshot);
            };
            let upright = geometry.to_upright(region);
            let path = dir.join(snapshot_file_name(images, page.index + 1, &upright));
            write_crop(Arc::clone(bitmap), pixels, dir.clone(), path.clone(), images).await?;
            snapshot.image_path = Some(path.display().to_string());
        }

        if let (Some(provider), Some(bitmap)) = (ocr, &page.ocr_bitmap) {
            let Some(pixels) = crop_rect(geometry, region, bitmap.width(), bitmap.height()) else {
                warn!(page = page.index + 1, ?region, "image region has no pixels on the page, skipping OCR");
                return Ok(snapshot);
            };
            let bitmap = Arc::clone(bitmap);
            let png = tokio::task::spawn_blocking(move || {
                let cropped = raster::crop(&bitmap, pixels)?;
                raster::encode_png(&cropped)
            })
            .await??;
            let text = provider.recognize(&png).await?;
            debug!(page = page.index + 1, chars = text.len(), "recognised snapshot");
            snapshot.ocr_text = (!text.is_empty()).then_some(text);
        }

        Ok(snapshot)
    }
}

async fn write_crop(
    bitmap: Arc<RgbImage>,
    pixels: PixelRect,
    dir: PathBuf,
    path: PathBuf,
    images: &ImageConfig,
) -> Result<()> {
    let (format, quality) = (images.format, images.quality);
    tokio::task::spawn_blocking(move || {
        std::fs::create_dir_all(&dir)?;
        let cropped = raster::crop(&bitmap, pixels)?;
        raster::write_image(&cropped, &path, format, quality)
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImageFormat;
    use crate::geometry::Rotation;

    fn letter(rotation: Rotation) -> PageGeometry {
        PageGeometry::new(Rect::new(0.0, 0.0, 612.0, 792.0), None, rotation)
    }

    #[test]
    fn test_crop_rect_unrotated() {
        // 612x792 rendered at 2x
        let geometry = letter(Rotation::Deg0);
        let region = Rect::new(100.0, 600.0, 200.0, 700.0);
        let pixels = crop_rect(&geometry, &region, 1224, 1584).unwrap();
        assert_eq!(pixels, PixelRect { x: 200, y: 184, width: 200, height: 200 });
    }

    #[test]
    fn test_crop_rect_rotated_page() {
        // Upright page is 792x612; native (100,600)-(200,700) lands at
        // upright (600,412)-(700,512)
        let geometry = letter(Rotation::Deg90);
        let region = Rect::new(100.0, 600.0, 200.0, 700.0);
        let pixels = crop_rect(&geometry, &region, 792, 612).unwrap();
        assert_eq!(pixels, PixelRect { x: 600, y: 100, width: 100, height: 100 });
    }

    #[test]
    fn test_crop_rect_outside_page() {
        let geometry = letter(Rotation::Deg0);
        let region = Rect::new(700.0, 900.0, 800.0, 1000.0);
        assert_eq!(crop_rect(&geometry, &region, 612, 792), None);
    }

    #[test]
    fn test_crop_rect_zero_area() {
        let geometry = letter(Rotation::Deg0);
        let region = Rect::new(100.0, 600.0, 100.0, 700.0);
        assert_eq!(crop_rect(&geometry, &region, 1224, 1584), None);
    }

    #[test]
    fn test_crop_rect_in_crop_box_margin() {
        // Region sits in the bottom-left margin cut away by the crop box
        let geometry = PageGeometry::new(
            Rect::new(0.0, 0.0, 612.0, 792.0),
            Some(Rect::new(36.0, 36.0, 576.0, 756.0)),
            Rotation::Deg0,
        );
        let region = Rect::new(5.0, 5.0, 30.0, 30.0);
        assert_eq!(crop_rect(&geometry, &region, 900, 1200), None);
    }

    #[test]
    fn test_file_name() {
        let images = ImageConfig {
            base_name: "note".into(),
            format: ImageFormat::Png,
            ..ImageConfig::default()
        };
        let name = snapshot_file_name(&images, 3, &Rect::new(72.9, 100.2, 80.0, 120.0));
        assert_eq!(name, "note-3-x72-y100.png");
    }
}
