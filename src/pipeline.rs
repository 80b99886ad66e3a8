//! Document orchestration
//!
//! [`Extractor::run`] fans out one task per page and, inside each page, one
//! task per annotation. Results land in slots addressed by page index and
//! `/Annots` position, so the output follows document order whatever order
//! the tasks finish in. The first error a tier observes is returned once
//! every task of that tier has finished.

use std::future::Future;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::Mutex;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::annotation::{build_record, AnnotationKind, AnnotationRecord, Classified, IdRegistry, PageContext};
use crate::backend::{PdfDocument, RawAnnotation};
use crate::config::{Config, OCR_DPI};
use crate::error::{ExtractError, Result};
use crate::geometry::PageGeometry;
use crate::ocr::OcrProvider;
use crate::page_labels::PageLabels;

/// Runs a document through the annotation pipeline
#[derive(Clone)]
pub struct Extractor {
    document: Arc<dyn PdfDocument>,
    config: Arc<Config>,
    ocr: Option<Arc<dyn OcrProvider>>,
    /// Serialises annotation fetches across pages
    fetch_lock: Arc<Mutex<()>>,
}

impl Extractor {
    pub fn new(document: Arc<dyn PdfDocument>, config: Config) -> Self {
        Self {
            document,
            config: Arc::new(config),
            ocr: None,
            fetch_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Recognise text in image annotations with `provider`
    ///
    /// Ignored unless images are enabled in the config.
    pub fn with_ocr(mut self, provider: Arc<dyn OcrProvider>) -> Self {
        self.ocr = Some(provider);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extract every record, ordered by page then `/Annots` position
    pub async fn run(&self) -> Result<Vec<AnnotationRecord>> {
        let document = Arc::clone(&self.document);
        let (page_count, ranges) = tokio::task::spawn_blocking(move || -> Result<_> {
            Ok((document.page_count()?, document.page_label_ranges()?))
        })
        .await??;
        let labels = PageLabels::resolve(ranges.as_deref(), page_count);
        info!(pages = page_count, "extracting annotations");

        let tasks: FuturesUnordered<_> = (0..page_count)
            .map(|index| {
                let extractor = self.clone();
                let label = labels.label_or_number(index);
                let handle = tokio::spawn(async move { extractor.process_page(index, label).await });
                async move { (index, handle.await) }
            })
            .collect();

        let pages = join_ordered(page_count, tasks).await?;
        let records: Vec<AnnotationRecord> = pages.into_iter().flatten().collect();
        info!(records = records.len(), "extraction finished");
        Ok(records)
    }

    async fn process_page(&self, index: usize, label: String) -> Result<Vec<AnnotationRecord>> {
        let annotations = self.fetch_annotations(index).await?;
        if annotations.is_empty() {
            return Ok(Vec::new());
        }

        let kinds: Vec<AnnotationKind> = annotations
            .iter()
            .filter_map(Classified::new)
            .map(|classified| classified.kind)
            .collect();
        let has_markup = kinds.iter().any(|kind| kind.is_markup());
        let has_images = self.config.images.enabled() && kinds.contains(&AnnotationKind::Rectangle);
        debug!(page = index + 1, annotations = annotations.len(), has_markup, has_images, "processing page");

        let geometry = self.page_geometry(index).await?;
        let text = match (has_markup, geometry) {
            (true, Some(geometry)) => {
                let document = Arc::clone(&self.document);
                let text = tokio::task::spawn_blocking(move || document.page_text(index, &geometry)).await??;
                Some(Arc::new(text))
            }
            _ => None,
        };

        let mut bitmap = None;
        let mut ocr_bitmap = None;
        if has_images {
            if self.config.needs_page_bitmap() {
                bitmap = Some(self.render(index, self.config.images.dpi as f64).await?);
            }
            if self.config.needs_ocr_bitmap() && self.ocr.is_some() {
                ocr_bitmap = Some(self.render(index, OCR_DPI).await?);
            }
        }

        let page = Arc::new(PageContext {
            index,
            label,
            geometry,
            text,
            bitmap,
            ocr_bitmap,
            ids: IdRegistry::new(),
        });

        let count = annotations.len();
        let tasks: FuturesUnordered<_> = annotations
            .into_iter()
            .enumerate()
            .map(|(slot, raw)| {
                let page = Arc::clone(&page);
                let document = Arc::clone(&self.document);
                let config = Arc::clone(&self.config);
                let ocr = self.ocr.clone();
                let handle = tokio::spawn(async move {
                    build_record(&raw, &page, &document, &config, ocr.as_ref()).await
                });
                async move { (slot, handle.await) }
            })
            .collect();

        let records = join_ordered(count, tasks).await?;
        Ok(records.into_iter().flatten().collect())
    }

    /// Annotations with an extracted subtype, in `/Annots` order
    async fn fetch_annotations(&self, index: usize) -> Result<Vec<RawAnnotation>> {
        let document = Arc::clone(&self.document);
        let lock = Arc::clone(&self.fetch_lock);
        let annotations = tokio::task::spawn_blocking(move || {
            let _guard = lock.lock();
            document.annotations(index)
        })
        .await??;

        let total = annotations.len();
        let supported: Vec<RawAnnotation> = annotations
            .into_iter()
            .filter(|raw| Classified::new(raw).is_some())
            .collect();
        if supported.len() < total {
            debug!(page = index + 1, skipped = total - supported.len(), "skipped unsupported annotations");
        }
        Ok(supported)
    }

    /// Page boxes, `None` when the page has no MediaBox anywhere up the tree
    async fn page_geometry(&self, index: usize) -> Result<Option<PageGeometry>> {
        let document = Arc::clone(&self.document);
        match tokio::task::spawn_blocking(move || document.page_geometry(index)).await? {
            Ok(geometry) => Ok(Some(geometry)),
            Err(ExtractError::MediaBoxNotFound(_)) => {
                warn!(page = index + 1, "no MediaBox; positioned annotations on this page will fail");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn render(&self, index: usize, dpi: f64) -> Result<Arc<image::RgbImage>> {
        let document = Arc::clone(&self.document);
        let bitmap = tokio::task::spawn_blocking(move || document.render(index, dpi)).await??;
        Ok(Arc::new(bitmap))
    }
}

/// Drain a tier of `(slot, joined task)` futures into slot order
///
/// Every task runs to completion; the first error observed is returned after
/// the last one finishes.
async fn join_ordered<T, F>(len: usize, mut tasks: FuturesUnordered<F>) -> Result<Vec<T>>
where
    F: Future<Output = (usize, std::result::Result<Result<T>, JoinError>)>,
{
    let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(len).collect();
    let mut first_error = None;

    while let Some((slot, joined)) = tasks.next().await {
        match joined.map_err(ExtractError::from).and_then(|result| result) {
            Ok(value) => {
                if let Some(entry) = slots.get_mut(slot) {
                    *entry = Some(value);
                }
            }
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(slots.into_iter().flatten().collect()),
    }
}
