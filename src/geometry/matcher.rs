//! Geometric matching of annotation quads against page text runs

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Rect;
use crate::backend::TextRun;

/// Fraction of a markup quad's height trimmed before matching
pub const DEFAULT_BAND_SHRINK: f64 = 0.6;

/// Minimum share of a run's own area that must fall inside the band
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.5;

/// Tunable matching constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Vertical shrink applied around the quad's centre (0.6 keeps the middle 40%)
    pub band_shrink: f64,
    /// Intersection / run area needed for a run to belong to the quad
    pub overlap_threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            band_shrink: DEFAULT_BAND_SHRINK,
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
        }
    }
}

/// Result of matching one quadrilateral
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionMatch {
    /// Union of the matched runs' rectangles, `None` when nothing matched
    pub bounds: Option<Rect>,
    /// Indices of matched runs, ascending by text offset
    pub runs: Vec<usize>,
    /// Offset of the first matched run in the flattened page text
    pub first_offset: Option<usize>,
}

impl RegionMatch {
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Does `run` belong to `band`?
///
/// The overlap is measured against the run's own area, so a small glyph
/// fully inside a large band always matches.
pub fn run_overlaps(band: &Rect, run: &Rect, threshold: f64) -> bool {
    if run.is_empty() || !band.intersects(run) {
        return false;
    }
    match band.intersection(run) {
        Some(overlap) => overlap.area() / run.area() >= threshold,
        None => false,
    }
}

/// Match a single quad against every run on the page
pub fn match_quad(quad: &Rect, runs: &[TextRun], config: &MatchConfig) -> RegionMatch {
    let band = quad.vertical_band(config.band_shrink);
    let mut matched: Vec<usize> = runs
        .iter()
        .enumerate()
        .filter(|(_, run)| run_overlaps(&band, &run.rect, config.overlap_threshold))
        .map(|(index, _)| index)
        .collect();
    matched.sort_by_key(|&index| runs[index].offset);

    let bounds = matched
        .iter()
        .map(|&index| runs[index].rect)
        .reduce(|acc, rect| acc.union(&rect));
    let first_offset = matched.first().map(|&index| runs[index].offset);

    RegionMatch {
        bounds,
        runs: matched,
        first_offset,
    }
}

/// Match every quad of one annotation, in quad order
///
/// Returns `None` when any quad is degenerate; the annotation then carries
/// no text at all.
pub fn match_quads(quads: &[Rect], runs: &[TextRun], config: &MatchConfig) -> Option<Vec<RegionMatch>> {
    if let Some(bad) = quads.iter().find(|quad| quad.is_empty()) {
        debug!(?bad, "degenerate annotation quad, skipping text");
        return None;
    }
    Some(
        quads
            .iter()
            .map(|quad| match_quad(quad, runs, config))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, offset: usize, rect: Rect) -> TextRun {
        TextRun {
            text: text.to_string(),
            offset,
            rect,
        }
    }

    /// Three glyph rows, 12pt tall, 14pt apart
    fn three_lines() -> Vec<TextRun> {
        vec![
            run("A", 0, Rect::new(100.0, 700.0, 107.0, 712.0)),
            run("B", 2, Rect::new(100.0, 686.0, 107.0, 698.0)),
            run("C", 4, Rect::new(100.0, 672.0, 107.0, 684.0)),
        ]
    }

    #[test]
    fn test_run_fully_inside_huge_band_matches() {
        let config = MatchConfig::default();
        let glyph = Rect::new(300.0, 400.0, 305.0, 410.0);
        // Band area dwarfs the glyph; only the glyph's own area counts
        let quad = Rect::new(0.0, 0.0, 612.0, 792.0);
        assert!(run_overlaps(&quad.vertical_band(config.band_shrink), &glyph, 0.5));

        let m = match_quad(&quad, &[run("x", 0, glyph)], &config);
        assert_eq!(m.runs, vec![0]);
        assert_eq!(m.bounds, Some(glyph));
    }

    #[test]
    fn test_partial_overlap_below_threshold() {
        let band = Rect::new(0.0, 0.0, 100.0, 10.0);
        let glyph = Rect::new(90.0, 0.0, 110.0, 10.0);
        assert!(run_overlaps(&band, &glyph, 0.5));
        let glyph = Rect::new(95.0, 0.0, 115.0, 10.0);
        assert!(!run_overlaps(&band, &glyph, 0.5));
    }

    #[test]
    fn test_band_excludes_adjacent_lines() {
        let runs = three_lines();
        // Highlight drawn generously around the middle line, bleeding into its neighbours
        let quad = Rect::new(95.0, 682.0, 110.0, 702.0);
        let m = match_quad(&quad, &runs, &MatchConfig::default());
        assert_eq!(m.runs, vec![1]);
        assert_eq!(m.first_offset, Some(2));

        let loose = MatchConfig {
            band_shrink: 0.0,
            overlap_threshold: 0.1,
        };
        let m = match_quad(&quad, &runs, &loose);
        assert_eq!(m.runs, vec![0, 1, 2]);
    }

    #[test]
    fn test_bounds_merge_matched_runs() {
        let runs = vec![
            run("lo", 10, Rect::new(100.0, 700.0, 110.0, 712.0)),
            run("rem", 5, Rect::new(80.0, 701.0, 95.0, 711.0)),
        ];
        let quad = Rect::new(70.0, 698.0, 120.0, 714.0);
        let m = match_quad(&quad, &runs, &MatchConfig::default());
        // Sorted by offset, not by slice position
        assert_eq!(m.runs, vec![1, 0]);
        assert_eq!(m.first_offset, Some(5));
        assert_eq!(m.bounds, Some(Rect::new(80.0, 700.0, 110.0, 712.0)));
    }

    #[test]
    fn test_degenerate_runs_never_match() {
        let runs = vec![run(" ", 0, Rect::new(100.0, 700.0, 100.0, 712.0))];
        let m = match_quad(&Rect::new(0.0, 0.0, 612.0, 792.0), &runs, &MatchConfig::default());
        assert!(m.is_empty());
        assert_eq!(m.bounds, None);
    }

    #[test]
    fn test_degenerate_quad_aborts() {
        let runs = three_lines();
        let quads = vec![
            Rect::new(95.0, 698.0, 110.0, 714.0),
            Rect::new(95.0, 690.0, 95.0, 700.0),
        ];
        assert!(match_quads(&quads, &runs, &MatchConfig::default()).is_none());
    }

    #[test]
    fn test_quads_matched_in_order() {
        let runs = three_lines();
        let quads = vec![
            Rect::new(95.0, 669.0, 110.0, 687.0),
            Rect::new(95.0, 697.0, 110.0, 715.0),
        ];
        let matches = match_quads(&quads, &runs, &MatchConfig::default()).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].runs, vec![2]);
        assert_eq!(matches[1].runs, vec![0]);
    }
}
