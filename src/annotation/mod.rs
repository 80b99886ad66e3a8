//! Annotation records
//!
//! [`AnnotationKind`] classifies a PDF `/Subtype` through a static table
//! that also says where each kind keeps its region. [`AnnotationRecord`] is
//! the serialized output unit; [`build_record`] assembles one.

mod builder;
mod color;
mod date;
mod id;
mod snapshot;

pub use builder::{build_record, PageContext};
pub use color::{categorize, rgb_components, to_hex, to_hsl, ColorCategory};
pub use date::{format_date, parse_pdf_date};
pub use id::IdRegistry;
pub use snapshot::{crop_rect, snapshot_file_name, Snapshot};

use serde::{Deserialize, Serialize};

use crate::backend::RawAnnotation;
use crate::geometry::Rect;

/// Output `type` of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Highlight,
    Strike,
    Underline,
    Text,
    Rectangle,
    Image,
}

impl AnnotationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnnotationKind::Highlight => "highlight",
            AnnotationKind::Strike => "strike",
            AnnotationKind::Underline => "underline",
            AnnotationKind::Text => "text",
            AnnotationKind::Rectangle => "rectangle",
            AnnotationKind::Image => "image",
        }
    }

    /// Look up a `/Subtype`; `None` for subtypes that produce no record
    pub fn from_subtype(subtype: &str) -> Option<Self> {
        KindEntry::lookup(subtype).map(|entry| entry.kind)
    }

    /// Text markup: the annotated text is resolved from QuadPoints
    pub fn is_markup(self) -> bool {
        matches!(
            self,
            AnnotationKind::Highlight | AnnotationKind::Strike | AnnotationKind::Underline
        )
    }
}

type Accessor = fn(&RawAnnotation) -> Option<&[f64]>;

/// One row of the subtype table
#[derive(Debug)]
struct KindEntry {
    subtype: &'static str,
    kind: AnnotationKind,
    quads: Accessor,
    region: Accessor,
    color: Accessor,
}

fn quad_points(raw: &RawAnnotation) -> Option<&[f64]> {
    raw.quad_points.as_deref()
}

fn rect(raw: &RawAnnotation) -> Option<&[f64]> {
    raw.rect.as_deref()
}

fn color(raw: &RawAnnotation) -> Option<&[f64]> {
    raw.color.as_deref()
}

fn none(_: &RawAnnotation) -> Option<&[f64]> {
    None
}

const KIND_TABLE: &[KindEntry] = &[
    KindEntry { subtype: "Highlight", kind: AnnotationKind::Highlight, quads: quad_points, region: none, color },
    KindEntry { subtype: "StrikeOut", kind: AnnotationKind::Strike, quads: quad_points, region: none, color },
    KindEntry { subtype: "Underline", kind: AnnotationKind::Underline, quads: quad_points, region: none, color },
    KindEntry { subtype: "Text", kind: AnnotationKind::Text, quads: none, region: none, color },
    KindEntry { subtype: "Square", kind: AnnotationKind::Rectangle, quads: none, region: rect, color },
];

impl KindEntry {
    fn lookup(subtype: &str) -> Option<&'static KindEntry> {
        KIND_TABLE.iter().find(|entry| entry.subtype == subtype)
    }
}

/// A raw annotation whose subtype has a record kind
#[derive(Debug, Clone, Copy)]
pub struct Classified<'a> {
    pub raw: &'a RawAnnotation,
    pub kind: AnnotationKind,
    entry: &'static KindEntry,
}

impl<'a> Classified<'a> {
    pub fn new(raw: &'a RawAnnotation) -> Option<Self> {
        let entry = KindEntry::lookup(&raw.subtype)?;
        Some(Self {
            raw,
            kind: entry.kind,
            entry,
        })
    }

    /// QuadPoints of markup kinds
    pub fn quad_points(&self) -> Option<&'a [f64]> {
        (self.entry.quads)(self.raw)
    }

    /// Region a snapshot is cut from
    pub fn region(&self) -> Option<Rect> {
        (self.entry.region)(self.raw).and_then(Rect::from_array)
    }

    pub fn color(&self) -> Option<&'a [f64]> {
        (self.entry.color)(self.raw)
    }
}

/// One extracted annotation
///
/// Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotated_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_category: Option<ColorCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<String>,
    /// 1-based
    pub page: usize,
    pub page_label: String,
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    pub x: f64,
    pub y: f64,
}

/// Anchor from a native `/Rect`: its lower-left corner, two decimals
pub fn anchor(rect: &Rect) -> (f64, f64) {
    (round2(rect.x0), round2(rect.y0))
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
