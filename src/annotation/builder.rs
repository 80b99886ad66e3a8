//! Per-annotation record assembly

use std::sync::Arc;

use image::RgbImage;
use tracing::{debug, warn};

use super::color::{categorize, rgb_components, to_hex};
use super::date::{format_date, parse_pdf_date};
use super::id::IdRegistry;
use super::snapshot::Snapshot;
use super::{anchor, AnnotationKind, AnnotationRecord, Classified};
use crate::backend::{PageText, PdfDocument, RawAnnotation};
use crate::config::Config;
use crate::error::{ExtractError, Result};
use crate::geometry::{match_quads, quad_rects, PageGeometry, Rect};
use crate::ocr::OcrProvider;
use crate::text::{resolve_annotated_text, strip_control};

/// Everything an annotation task reads about its page
///
/// Built once by the page task and shared read-only, apart from the ID
/// registry.
#[derive(Debug, Default)]
pub struct PageContext {
    /// Zero-based page index
    pub index: usize,
    pub label: String,
    /// `None` when no MediaBox could be found for the page
    pub geometry: Option<PageGeometry>,
    /// Present when the page has text markup annotations
    pub text: Option<Arc<PageText>>,
    /// Render at the image output resolution
    pub bitmap: Option<Arc<RgbImage>>,
    /// Render at the OCR resolution
    pub ocr_bitmap: Option<Arc<RgbImage>>,
    pub ids: IdRegistry,
}

impl PageContext {
    fn require_geometry(&self) -> Result<PageGeometry> {
        self.geometry.ok_or(ExtractError::MediaBoxNotFound(self.index))
    }
}

/// Build the record for one annotation
///
/// `Ok(None)` means the annotation produces no record: its subtype is not
/// extracted or it predates [`Config::ignore_before`].
pub async fn build_record(
    raw: &RawAnnotation,
    page: &Arc<PageContext>,
    document: &Arc<dyn PdfDocument>,
    config: &Config,
    ocr: Option<&Arc<dyn OcrProvider>>,
) -> Result<Option<AnnotationRecord>> {
    let Some(classified) = Classified::new(raw) else {
        return Ok(None);
    };
    let page_number = page.index + 1;

    let date = raw.modified.as_deref().and_then(|value| {
        let parsed = parse_pdf_date(value);
        if parsed.is_none() {
            debug!(page = page_number, value, "unparseable annotation date");
        }
        parsed
    });
    if let (Some(cutoff), Some(date)) = (config.ignore_before, date) {
        if date < cutoff {
            debug!(page = page_number, %date, "skipping annotation before cutoff");
            return Ok(None);
        }
    }

    let rect = raw
        .rect
        .as_deref()
        .ok_or_else(|| malformed(page_number, "missing /Rect"))
        .and_then(|values| {
            Rect::from_array(values).ok_or_else(|| malformed(page_number, format!("{values:?}")))
        })?;
    let (x, y) = anchor(&rect);
    let id = page.ids.assign(classified.kind, page_number, x, y);

    let rgb = classified.color().and_then(rgb_components);
    let comment = raw
        .contents
        .as_deref()
        .map(strip_control)
        .filter(|comment| !comment.is_empty());

    let mut record = AnnotationRecord {
        annotated_text: None,
        color: rgb.map(to_hex),
        color_category: rgb.map(categorize),
        comment,
        date: date.as_ref().map(format_date),
        id,
        image_path: None,
        ocr_text: None,
        page: page_number,
        page_label: page.label.clone(),
        kind: classified.kind,
        x,
        y,
    };

    match classified.kind {
        AnnotationKind::Rectangle if config.images.enabled() => {
            let geometry = page.require_geometry()?;
            let region = classified.region().unwrap_or(rect);
            let snapshot = Snapshot::take(page, &geometry, &region, &config.images, ocr).await?;
            record.kind = AnnotationKind::Image;
            record.image_path = snapshot.image_path;
            record.ocr_text = snapshot.ocr_text;
        }
        kind if kind.is_markup() => {
            record.annotated_text = markup_text(&classified, page, document, config).await?;
        }
        _ => {}
    }

    Ok(Some(record))
}

/// Text under a markup annotation's QuadPoints
async fn markup_text(
    classified: &Classified<'_>,
    page: &Arc<PageContext>,
    document: &Arc<dyn PdfDocument>,
    config: &Config,
) -> Result<Option<String>> {
    let quads = classified.quad_points().map(quad_rects).unwrap_or_default();
    if quads.is_empty() {
        warn!(page = page.index + 1, kind = classified.kind.as_str(), "annotation has no usable QuadPoints");
        return Ok(None);
    }

    let page_text = page.text.clone().unwrap_or_default();
    let Some(regions) = match_quads(&quads, &page_text.runs, &config.matching) else {
        return Ok(None);
    };
    let geometry = page.require_geometry()?;

    let document = Arc::clone(document);
    let index = page.index;
    let (matching, fallback) = (config.matching, config.fallback);
    tokio::task::spawn_blocking(move || {
        resolve_annotated_text(
            document.as_ref(),
            index,
            &geometry,
            &page_text,
            &regions,
            &matching,
            &fallback,
        )
    })
    .await?
}

fn malformed(page: usize, reason: impl Into<String>) -> ExtractError {
    ExtractError::MalformedRect {
        page,
        reason: reason.into(),
    }
}
