//! Extraction configuration
//!
//! Built once (by the CLI or a caller) and shared read-only through the
//! pipeline as `Arc<Config>`.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::geometry::MatchConfig;
use crate::text::FallbackPolicy;

/// Resolution OCR bitmaps are rendered at
pub const OCR_DPI: f64 = 300.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Drop annotations dated before this instant
    pub ignore_before: Option<DateTime<FixedOffset>>,
    pub images: ImageConfig,
    /// OCR is attempted on image annotations when set
    pub ocr: Option<OcrConfig>,
    pub matching: MatchConfig,
    pub fallback: FallbackPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Directory crops are written to; images are skipped when unset
    pub output_dir: Option<PathBuf>,
    /// File name stem; images are skipped when empty
    pub base_name: String,
    pub format: ImageFormat,
    pub dpi: u32,
    /// JPEG quality, 1-100
    pub quality: u8,
    /// Write crops to disk (and report `imagePath`)
    pub write: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Jpg,
    Png,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    pub tesseract_path: PathBuf,
    /// `+`-separated tesseract language codes
    pub lang: String,
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        ImageConfig {
            output_dir: None,
            base_name: "annot".to_string(),
            format: ImageFormat::Jpg,
            dpi: 120,
            quality: 90,
            write: true,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        OcrConfig {
            tesseract_path: PathBuf::from("tesseract"),
            lang: "eng".to_string(),
            tessdata_dir: None,
        }
    }
}

impl ImageConfig {
    /// Rectangle annotations become image annotations
    pub fn enabled(&self) -> bool {
        self.output_dir.is_some() && !self.base_name.is_empty()
    }
}

impl Config {
    /// A page bitmap at the output resolution is needed
    pub fn needs_page_bitmap(&self) -> bool {
        self.images.enabled() && self.images.write
    }

    /// A page bitmap at [`OCR_DPI`] is needed
    pub fn needs_ocr_bitmap(&self) -> bool {
        self.images.enabled() && self.ocr.is_some()
    }
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_images_disabled_by_default() {
        let config = Config::default();
        assert!(!config.images.enabled());
        assert!(!config.needs_page_bitmap());
        assert!(!config.needs_ocr_bitmap());
    }

    #[test]
    fn test_bitmap_requirements() {
        let mut config = Config::default();
        config.images.output_dir = Some(PathBuf::from("/tmp/out"));
        assert!(config.needs_page_bitmap());
        assert!(!config.needs_ocr_bitmap());

        config.images.write = false;
        config.ocr = Some(OcrConfig::default());
        assert!(!config.needs_page_bitmap());
        assert!(config.needs_ocr_bitmap());

        config.images.base_name.clear();
        assert!(!config.images.enabled());
        assert!(!config.needs_ocr_bitmap());
    }

    #[test]
    fn test_image_format_extension() {
        assert_eq!(ImageFormat::Jpg.to_string(), "jpg");
        assert_eq!(ImageFormat::Png.extension(), "png");
    }
}
