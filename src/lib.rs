//! PDF annotation extraction
//!
//! Reads highlight, underline, strikeout, note and square annotations from a
//! PDF and turns them into [`annotation::AnnotationRecord`]s carrying the
//! text under each markup, colour, date, page label and, for squares, a
//! cropped image with optional OCR text.
//!
//! # Modules
//!
//! - `geometry`: rectangles, page rotation and crop-box transforms, quad matching
//! - `text`: whitespace normalisation and annotated-text resolution
//! - `annotation`: subtype table, record assembly, IDs, colours, dates, snapshots
//! - `page_labels`: `/PageLabels` formatting
//! - `backend`: document traits plus the lopdf + MuPDF implementation
//! - `ocr`: tesseract subprocess provider
//! - `raster`: bitmap crops and image encoding
//! - `pipeline`: concurrent per-page, per-annotation orchestration
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pdf_annots::{backend::PdfFile, config::Config, pipeline::Extractor};
//!
//! let document = PdfFile::open("book.pdf")?;
//! let records = Extractor::new(Arc::new(document), Config::default()).run().await?;
//! println!("{}", serde_json::to_string(&records)?);
//! ```

pub mod annotation;
pub mod backend;
pub mod config;
pub mod error;
pub mod geometry;
pub mod ocr;
pub mod page_labels;
pub mod pipeline;
pub mod raster;
pub mod text;

mod mupdf;

pub use error::{ExtractError, Result};
