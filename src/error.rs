//! Extraction error types
//!
//! One error type for the whole extraction run. Structural problems that only
//! affect optional data are recovered where they occur; everything that
//! reaches this enum aborts the run.

use thiserror::Error;

use crate::ocr::OcrError;

/// Unified extraction error type
#[derive(Debug, Error)]
pub enum ExtractError {
    /// IO error (std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Object model error from lopdf
    #[error("PDF error: {0}")]
    Pdf(String),

    /// MuPDF context error
    #[error("MuPDF error: {0}")]
    MuPdf(String),

    /// Document is encrypted and the empty password did not unlock it
    #[error("Document is encrypted and cannot be opened without a password")]
    Encrypted,

    /// Page index outside the document
    #[error("Page not found: index {index} (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    /// Neither the page nor any ancestor carries a MediaBox
    #[error("MediaBox not found for page {0}")]
    MediaBoxNotFound(usize),

    /// Annotation Rect missing or not four numbers
    #[error("Malformed annotation rectangle on page {page}: {reason}")]
    MalformedRect { page: usize, reason: String },

    /// Text extraction error
    #[error("Text extraction error: {0}")]
    TextExtraction(String),

    /// Failed to rasterise a page
    #[error("Render error: {0}")]
    Render(String),

    /// Requested crop does not overlap the rendered bitmap
    #[error("Cannot crop region {0:?} from a {1}x{2} bitmap")]
    CropUnsupported([u32; 4], u32, u32),

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// OCR error
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Background task panicked or was cancelled
    #[error("Task join error: {0}")]
    TaskJoin(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

impl From<mupdf::Error> for ExtractError {
    fn from(err: mupdf::Error) -> Self {
        ExtractError::MuPdf(err.to_string())
    }
}

impl From<lopdf::Error> for ExtractError {
    fn from(err: lopdf::Error) -> Self {
        ExtractError::Pdf(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ExtractError {
    fn from(err: tokio::task::JoinError) -> Self {
        ExtractError::TaskJoin(err.to_string())
    }
}
