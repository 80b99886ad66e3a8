//! Low-level MuPDF Wrapper
//!
//! MuPDF supplies the two things lopdf cannot: positioned text from the
//! structured-text device and page rasterisation.
//!
//! # Thread Safety
//!
//! MuPDF's `fz_context` is **NOT thread-safe**. [`SafeDocument`] keeps the
//! source bytes, opens a fresh document per operation and serialises
//! operations behind a mutex, so it can be shared across tokio's blocking
//! pool.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::mupdf::SafeDocument;
//!
//! let doc = SafeDocument::from_bytes(pdf_bytes)?;
//! let bitmap = doc.render(0, 120.0)?;
//! let text = doc.page_text(0, &geometry)?;
//! ```

mod render;
mod safe;
mod stext;

pub use safe::SafeDocument;
