//! lopdf-backed object model
//!
//! Reads the page tree, inherited page boxes, annotation dictionaries and
//! the page-label number tree. Nothing here decodes content streams.

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, warn};

use super::RawAnnotation;
use crate::error::{ExtractError, Result};
use crate::geometry::{PageGeometry, Rect, Rotation};
use crate::page_labels::{LabelStyle, PageLabelRange};

/// Guard against reference cycles in malformed files
const MAX_DEPTH: usize = 64;

/// Parsed document plus its page list in page-tree order
pub struct ObjectModel {
    doc: Document,
    pages: Vec<ObjectId>,
}

impl ObjectModel {
    /// Parse a document, decrypting with the empty password if needed
    pub fn load_mem(data: &[u8]) -> Result<Self> {
        let mut doc = Document::load_mem(data)?;
        if doc.is_encrypted() {
            if let Err(err) = doc.decrypt("") {
                warn!(%err, "empty-password decryption failed");
                return Err(ExtractError::Encrypted);
            }
        }
        Ok(Self::from_document(doc))
    }

    pub fn from_document(doc: Document) -> Self {
        let pages = doc.get_pages().into_values().collect();
        Self { doc, pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_dict(&self, page: usize) -> Result<(ObjectId, &Dictionary)> {
        let id = *self.pages.get(page).ok_or(ExtractError::PageOutOfRange {
            index: page,
            count: self.pages.len(),
        })?;
        Ok((id, self.doc.get_dictionary(id)?))
    }

    /// Follow indirect references to the underlying object
    fn resolve<'a>(&'a self, mut obj: &'a Object) -> Option<&'a Object> {
        for _ in 0..MAX_DEPTH {
            match obj {
                Object::Reference(id) => obj = self.doc.get_object(*id).ok()?,
                other => return Some(other),
            }
        }
        None
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match self.resolve(obj)? {
            Object::Dictionary(dict) => Some(dict),
            Object::Stream(stream) => Some(&stream.dict),
            _ => None,
        }
    }

    fn lookup<'a>(&'a self, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        self.resolve(dict.get(key).ok()?)
    }

    /// Look up a page attribute, walking `/Parent` links when absent
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut dict = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_DEPTH {
            if let Some(value) = self.lookup(dict, key) {
                return Some(value);
            }
            dict = self.resolve_dict(dict.get(b"Parent").ok()?)?;
        }
        None
    }

    fn number(&self, obj: &Object) -> Option<f64> {
        match self.resolve(obj)? {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(f) => Some(*f as f64),
            _ => None,
        }
    }

    /// An array made entirely of numbers
    fn numbers(&self, obj: &Object) -> Option<Vec<f64>> {
        match self.resolve(obj)? {
            Object::Array(items) => items.iter().map(|item| self.number(item)).collect(),
            _ => None,
        }
    }

    fn rect(&self, obj: &Object) -> Option<Rect> {
        Rect::from_array(&self.numbers(obj)?)
    }

    fn text(&self, obj: &Object) -> Option<String> {
        match self.resolve(obj)? {
            Object::String(bytes, _) => Some(decode_text_string(bytes)),
            _ => None,
        }
    }

    pub fn page_geometry(&self, page: usize) -> Result<PageGeometry> {
        let (id, _) = self.page_dict(page)?;
        let media_box = self
            .inherited(id, b"MediaBox")
            .and_then(|obj| self.rect(obj))
            .ok_or(ExtractError::MediaBoxNotFound(page))?;
        let crop_box = self.inherited(id, b"CropBox").and_then(|obj| self.rect(obj));
        let rotation = self
            .inherited(id, b"Rotate")
            .and_then(|obj| self.number(obj))
            .map(|deg| Rotation::from_degrees(deg as i64))
            .unwrap_or_default();
        Ok(PageGeometry::new(media_box, crop_box, rotation))
    }

    pub fn annotations(&self, page: usize) -> Result<Vec<RawAnnotation>> {
        let (_, dict) = self.page_dict(page)?;
        let Some(Object::Array(annots)) = self.lookup(dict, b"Annots") else {
            return Ok(Vec::new());
        };

        let mut out = Vec::with_capacity(annots.len());
        for (index, item) in annots.iter().enumerate() {
            let Some(annot) = self.resolve_dict(item) else {
                warn!(page, index, "skipping non-dictionary /Annots entry");
                continue;
            };
            let subtype = match self.lookup(annot, b"Subtype") {
                Some(Object::Name(name)) => String::from_utf8_lossy(name).into_owned(),
                _ => String::new(),
            };
            let field = |key: &[u8]| annot.get(key).ok();
            out.push(RawAnnotation {
                subtype,
                rect: field(b"Rect").and_then(|obj| self.numbers(obj)),
                quad_points: field(b"QuadPoints").and_then(|obj| self.numbers(obj)),
                color: field(b"C").and_then(|obj| self.numbers(obj)),
                contents: field(b"Contents").and_then(|obj| self.text(obj)),
                modified: field(b"M")
                    .or_else(|| field(b"CreationDate"))
                    .and_then(|obj| self.text(obj)),
            });
        }
        debug!(page, count = out.len(), "read annotations");
        Ok(out)
    }

    /// Flatten the `/PageLabels` number tree into ranges, sorted by start page
    pub fn page_label_ranges(&self) -> Option<Vec<PageLabelRange>> {
        let root = self.resolve_dict(self.doc.trailer.get(b"Root").ok()?)?;
        let tree = self.resolve_dict(root.get(b"PageLabels").ok()?)?;

        let mut ranges = Vec::new();
        self.collect_label_nodes(tree, 0, &mut ranges);
        ranges.sort_by_key(|range| range.start);
        Some(ranges)
    }

    fn collect_label_nodes(&self, node: &Dictionary, depth: usize, out: &mut Vec<PageLabelRange>) {
        if depth >= MAX_DEPTH {
            return;
        }
        if let Some(Object::Array(nums)) = self.lookup(node, b"Nums") {
            for pair in nums.chunks_exact(2) {
                let start = match self.resolve(&pair[0]) {
                    Some(Object::Integer(i)) if *i >= 0 => *i as usize,
                    _ => continue,
                };
                if let Some(dict) = self.resolve_dict(&pair[1]) {
                    out.push(self.label_range(start, dict));
                }
            }
        }
        if let Some(Object::Array(kids)) = self.lookup(node, b"Kids") {
            for kid in kids {
                if let Some(kid) = self.resolve_dict(kid) {
                    self.collect_label_nodes(kid, depth + 1, out);
                }
            }
        }
    }

    fn label_range(&self, start: usize, dict: &Dictionary) -> PageLabelRange {
        let style = match self.lookup(dict, b"S") {
            Some(Object::Name(name)) => LabelStyle::from_name(name),
            _ => None,
        };
        let prefix = dict
            .get(b"P")
            .ok()
            .and_then(|obj| self.text(obj))
            .unwrap_or_default();
        let first = match self.lookup(dict, b"St") {
            Some(Object::Integer(i)) if *i >= 1 => *i,
            _ => 1,
        };
        PageLabelRange::new(start, style)
            .with_prefix(prefix)
            .with_first(first)
    }
}

/// Decode a PDF text string
///
/// UTF-16BE and UTF-8 are recognised by their byte-order marks; anything
/// else is read as UTF-8 when valid, otherwise as PDFDocEncoding.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| pdf_doc_char(b)).collect(),
    }
}

/// PDFDocEncoding code points that differ from Latin-1, starting at 0x80
const PDF_DOC_HIGH: [char; 33] = [
    '\u{2022}', '\u{2020}', '\u{2021}', '\u{2026}', '\u{2014}', '\u{2013}', '\u{0192}', '\u{2044}',
    '\u{2039}', '\u{203A}', '\u{2212}', '\u{2030}', '\u{201E}', '\u{201C}', '\u{201D}', '\u{2018}',
    '\u{2019}', '\u{201A}', '\u{2122}', '\u{FB01}', '\u{FB02}', '\u{0141}', '\u{0152}', '\u{0160}',
    '\u{0178}', '\u{017D}', '\u{0131}', '\u{0142}', '\u{0153}', '\u{0161}', '\u{017E}', '\u{FFFD}',
    '\u{20AC}',
];

/// Spacing accents at 0x18..=0x1F
const PDF_DOC_ACCENTS: [char; 8] = [
    '\u{02D8}', '\u{02C7}', '\u{02C6}', '\u{02D9}', '\u{02DD}', '\u{02DB}', '\u{02DA}', '\u{02DC}',
];

fn pdf_doc_char(byte: u8) -> char {
    match byte {
        0x18..=0x1F => PDF_DOC_ACCENTS[(byte - 0x18) as usize],
        0x80..=0xA0 => PDF_DOC_HIGH[(byte - 0x80) as usize],
        // Undefined
        0x7F | 0xAD => '\u{FFFD}',
        _ => byte as char,
    }
}
