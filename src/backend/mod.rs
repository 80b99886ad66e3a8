//! Document backends
//!
//! The extraction pipeline talks to PDFs only through the traits in this
//! module. [`PdfFile`] is the production implementation: lopdf for the object
//! model (page tree, annotations, labels) and MuPDF for structured text and
//! rasterisation.
//!
//! All methods are blocking; the pipeline calls them from
//! `tokio::task::spawn_blocking`.

mod objects;

pub use objects::ObjectModel;

use std::path::Path;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::geometry::{PageGeometry, Rect};
use crate::mupdf::SafeDocument;
use crate::page_labels::PageLabelRange;

/// A positioned glyph run from the page's text layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    /// Byte offset of `text` in [`PageText::text`]
    pub offset: usize,
    /// Bounding box in native page coordinates
    pub rect: Rect,
}

/// Flattened page text plus its runs, ordered by offset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    pub text: String,
    pub runs: Vec<TextRun>,
}

impl PageText {
    /// Character immediately before `offset`, if any
    pub fn char_before(&self, offset: usize) -> Option<char> {
        self.text.get(..offset)?.chars().next_back()
    }
}

/// Annotation dictionary fields the extractor reads
///
/// Numeric arrays that fail to parse are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAnnotation {
    /// `/Subtype` name
    pub subtype: String,
    /// `/Rect`, as stored
    pub rect: Option<Vec<f64>>,
    /// `/QuadPoints`
    pub quad_points: Option<Vec<f64>>,
    /// `/C`
    pub color: Option<Vec<f64>>,
    /// `/Contents`
    pub contents: Option<String>,
    /// `/M`, falling back to `/CreationDate`
    pub modified: Option<String>,
}

/// Object-model access: pages, boxes, annotations, labels
pub trait DocumentParser: Send + Sync {
    fn page_count(&self) -> Result<usize>;

    /// Media box, crop box and rotation of a zero-based page
    fn page_geometry(&self, page: usize) -> Result<PageGeometry>;

    /// Annotations of a zero-based page, in `/Annots` array order
    fn annotations(&self, page: usize) -> Result<Vec<RawAnnotation>>;

    /// Entries of the `/PageLabels` tree, `None` when the document has none
    fn page_label_ranges(&self) -> Result<Option<Vec<PageLabelRange>>>;
}

/// Positioned text access
pub trait TextExtractor: Send + Sync {
    /// Flattened text and runs, with run rectangles in native coordinates
    fn page_text(&self, page: usize, geometry: &PageGeometry) -> Result<PageText>;

    /// Text inside a top-down device rectangle expressed at `dpi`
    fn text_in_region(&self, page: usize, region: &Rect, dpi: f64) -> Result<String>;
}

/// Page rasterisation
pub trait PageRenderer: Send + Sync {
    fn render(&self, page: usize, dpi: f64) -> Result<RgbImage>;
}

/// Everything the pipeline needs from a document
pub trait PdfDocument: DocumentParser + TextExtractor + PageRenderer {}

impl<T: DocumentParser + TextExtractor + PageRenderer> PdfDocument for T {}

/// A PDF opened with both backends
pub struct PdfFile {
    objects: ObjectModel,
    content: SafeDocument,
}

impl PdfFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let objects = ObjectModel::load_mem(&data)?;
        let content = SafeDocument::from_bytes(data)?;
        debug!(
            pages = objects.page_count(),
            mupdf_pages = content.page_count(),
            "opened document"
        );
        Ok(Self { objects, content })
    }
}

impl DocumentParser for PdfFile {
    fn page_count(&self) -> Result<usize> {
        Ok(self.objects.page_count())
    }

    fn page_geometry(&self, page: usize) -> Result<PageGeometry> {
        self.objects.page_geometry(page)
    }

    fn annotations(&self, page: usize) -> Result<Vec<RawAnnotation>> {
        self.objects.annotations(page)
    }

    fn page_label_ranges(&self) -> Result<Option<Vec<PageLabelRange>>> {
        Ok(self.objects.page_label_ranges())
    }
}

impl TextExtractor for PdfFile {
    fn page_text(&self, page: usize, geometry: &PageGeometry) -> Result<PageText> {
        self.content.page_text(page, geometry)
    }

    fn text_in_region(&self, page: usize, region: &Rect, dpi: f64) -> Result<String> {
        self.content.text_in_region(page, region, dpi)
    }
}

impl PageRenderer for PdfFile {
    fn render(&self, page: usize, dpi: f64) -> Result<RgbImage> {
        self.content.render(page, dpi)
    }
}
