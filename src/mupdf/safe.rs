//! Thread-safe document wrapper for MuPDF
//!
//! MuPDF documents are not thread-safe. This wrapper:
//!
//! 1. Stores the document bytes
//! 2. Opens a fresh document for each operation
//! 3. Uses `parking_lot::Mutex` to serialize access
//!
//! No `Document` or `Page` ever escapes a closure, so the wrapper itself is
//! `Send + Sync` without any unsafe impls.

use std::sync::Arc;

use mupdf::{Document, Page};
use parking_lot::Mutex;
use tracing::warn;

use crate::error::{ExtractError, Result};

const PDF_MIME: &str = "application/pdf";

/// Thread-safe document wrapper
pub struct SafeDocument {
    /// Document source data
    data: Arc<Vec<u8>>,
    /// Cached page count
    page_count: usize,
    /// Mutex for serializing access
    lock: Mutex<()>,
}

impl SafeDocument {
    /// Validate the bytes open (and unlock) and cache the page count
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let data = Arc::new(data);
        let doc = open_unlocked(&data)?;
        let page_count = doc.page_count()? as usize;

        Ok(Self {
            data,
            page_count,
            lock: Mutex::new(()),
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Execute a closure with access to a freshly opened document
    pub fn with_doc<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Document) -> Result<R>,
    {
        let _guard = self.lock.lock();
        let doc = open_unlocked(&self.data)?;
        f(&doc)
    }

    /// Execute a closure with one loaded page
    pub fn with_page<F, R>(&self, page: usize, f: F) -> Result<R>
    where
        F: FnOnce(&Page) -> Result<R>,
    {
        if page >= self.page_count {
            return Err(ExtractError::PageOutOfRange {
                index: page,
                count: self.page_count,
            });
        }
        self.with_doc(|doc| {
            let page = doc.load_page(page as i32)?;
            f(&page)
        })
    }
}

/// Open the bytes and try the empty password if the file is encrypted
fn open_unlocked(data: &[u8]) -> Result<Document> {
    let mut doc = Document::from_bytes(data, PDF_MIME)?;
    if doc.needs_password()? && !doc.authenticate("")? {
        warn!("MuPDF rejected the empty password");
        return Err(ExtractError::Encrypted);
    }
    Ok(doc)
}
