//! Annotated-text resolution
//!
//! Two candidate texts are built for every markup annotation:
//!
//! - **primary**: the text layer queried inside each matched region's
//!   vertical band, as MuPDF lays it out
//! - **fallback**: the matched runs concatenated in text order, with a space
//!   wherever the page text had one before the run
//!
//! [`FallbackPolicy`] picks between them. The two thresholds are tuning
//! knobs for a heuristic, not a correctness criterion.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{condense_spaces, ends_with_whitespace, join_segments};
use crate::backend::{PageText, TextExtractor};
use crate::error::Result;
use crate::geometry::{MatchConfig, PageGeometry, RegionMatch};

/// Resolution the region query is expressed at
pub const REFERENCE_DPI: f64 = 72.0;

/// Replacement-character share above which the primary text is distrusted
pub const DEFAULT_MAX_REPLACEMENT_RATIO: f64 = 0.2;

/// Fallback wins when it has more than this many times the primary's spaces
pub const DEFAULT_SPACE_RATIO: f64 = 1.2;

/// U+FFFD as it appears after a UTF-8 → Latin-1 round trip
const MOJIBAKE_REPLACEMENT: &str = "\u{ef}\u{bf}\u{bd}";

/// Which candidate text was kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextChoice {
    Primary,
    Fallback,
}

/// Thresholds for preferring the fallback text
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallbackPolicy {
    pub max_replacement_ratio: f64,
    pub space_ratio: f64,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            max_replacement_ratio: DEFAULT_MAX_REPLACEMENT_RATIO,
            space_ratio: DEFAULT_SPACE_RATIO,
        }
    }
}

impl FallbackPolicy {
    /// Pick a candidate
    ///
    /// An empty fallback never wins.
    pub fn choose(&self, primary: &str, fallback: &str) -> TextChoice {
        if fallback.trim().is_empty() {
            return TextChoice::Primary;
        }
        if replacement_ratio(primary) > self.max_replacement_ratio {
            return TextChoice::Fallback;
        }
        let primary_spaces = count_spaces(primary) as f64;
        let fallback_spaces = count_spaces(fallback) as f64;
        if fallback_spaces > primary_spaces * self.space_ratio {
            return TextChoice::Fallback;
        }
        TextChoice::Primary
    }
}

/// Share of characters that are replacement characters
pub fn replacement_ratio(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let replaced = text.matches(char::REPLACEMENT_CHARACTER).count()
        + text.matches(MOJIBAKE_REPLACEMENT).count() * 3;
    replaced as f64 / total as f64
}

fn count_spaces(text: &str) -> usize {
    text.matches(' ').count()
}

/// Rebuild one region's text from its matched runs
pub fn fallback_segment(page: &PageText, region: &RegionMatch) -> String {
    let mut segment = String::new();
    for run in region.runs.iter().filter_map(|&index| page.runs.get(index)) {
        if run.text.is_empty() {
            continue;
        }
        let after_break = run.offset > 0 && matches!(page.char_before(run.offset), Some(' ' | '\n'));
        if !segment.is_empty() && after_break {
            segment.push(' ');
        }
        segment.push_str(&run.text);
    }
    segment
}

/// Query the text layer inside one region's band
fn primary_segment<E: TextExtractor + ?Sized>(
    extractor: &E,
    page: usize,
    geometry: &PageGeometry,
    region: &RegionMatch,
    config: &MatchConfig,
) -> Result<String> {
    let Some(bounds) = region.bounds else {
        return Ok(String::new());
    };
    let band = bounds.vertical_band(config.band_shrink);
    let device = geometry.to_device(&band);
    extractor.text_in_region(page, &device, REFERENCE_DPI)
}

/// Best text for an annotation's matched regions, condensed
///
/// Returns `None` when neither path yields any text. Errors come only from
/// the text-layer query.
pub fn resolve_annotated_text<E: TextExtractor + ?Sized>(
    extractor: &E,
    page: usize,
    geometry: &PageGeometry,
    page_text: &PageText,
    regions: &[RegionMatch],
    config: &MatchConfig,
    policy: &FallbackPolicy,
) -> Result<Option<String>> {
    let mut primary_parts = Vec::with_capacity(regions.len());
    for region in regions {
        primary_parts.push(primary_segment(extractor, page, geometry, region, config)?);
    }
    let primary = join_segments(&primary_parts, ends_with_whitespace);
    let fallback = join_segments(
        regions.iter().map(|region| fallback_segment(page_text, region)),
        ends_with_whitespace,
    );

    let choice = policy.choose(&primary, &fallback);
    if choice == TextChoice::Fallback {
        debug!(page, %primary, %fallback, "using fallback text");
    }
    let chosen = match choice {
        TextChoice::Primary => primary,
        TextChoice::Fallback => fallback,
    };

    let condensed = condense_spaces(&chosen);
    Ok((!condensed.is_empty()).then_some(condensed))
}
