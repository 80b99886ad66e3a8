//! OCR error type

/// OCR failures
///
/// `NotFound` and `InvalidLanguage` come from the precondition check and are
/// raised before any page is processed.
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("tesseract not found at {0}")]
    NotFound(String),

    #[error("tesseract does not support language: {0}")]
    InvalidLanguage(String),

    #[error("failed to run tesseract: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("tesseract failed: {0}")]
    Failed(String),
}
