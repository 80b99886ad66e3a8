//! OCR for image annotations
//!
//! The pipeline depends only on [`OcrProvider`]. The binary builds a
//! [`TesseractProvider`] through [`TesseractProvider::check`], which verifies
//! the executable and languages before any page is touched.
//!
//! ```rust,ignore
//! use pdf_annots::config::OcrConfig;
//! use pdf_annots::ocr::{OcrProvider, TesseractProvider};
//!
//! let provider = TesseractProvider::check(OcrConfig::default()).await?;
//! let text = provider.recognize(&png_bytes).await?;
//! ```

mod provider;
mod types;

pub use provider::{is_available, OcrProvider, TesseractProvider};
pub use types::OcrError;

#[cfg(test)]
pub(crate) use provider::MockProvider;
