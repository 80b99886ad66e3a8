//! Structured Text Helpers
//!
//! Page text with glyph positions, and text inside a device rectangle.

use mupdf::{Quad, TextPageOptions};

use super::SafeDocument;
use crate::backend::{PageText, TextRun};
use crate::error::{ExtractError, Result};
use crate::geometry::{PageGeometry, Rect};

/// Axis-aligned bounds of a glyph quad, in device space
pub fn quad_bounds(quad: &Quad) -> Rect {
    let xs = [quad.ul.x, quad.ur.x, quad.ll.x, quad.lr.x];
    let ys = [quad.ul.y, quad.ur.y, quad.ll.y, quad.lr.y];
    let min = |v: [f32; 4]| v.into_iter().fold(f32::INFINITY, f32::min) as f64;
    let max = |v: [f32; 4]| v.into_iter().fold(f32::NEG_INFINITY, f32::max) as f64;
    Rect::new(min(xs), min(ys), max(xs), max(ys))
}

impl SafeDocument {
    /// Flattened page text and one run per visible glyph
    ///
    /// Lines are separated by `\n`. Whitespace glyphs appear in the text but
    /// not as runs. Run rectangles are mapped back to native coordinates.
    pub fn page_text(&self, page: usize, geometry: &PageGeometry) -> Result<PageText> {
                self.with_page(page, |p| {
            let text_page = p
                .to_text_page(TextPageOptions::empty())
                .map_err(|e| ExtractError::TextExtraction(e.to_string()))?;

            let mut out = PageText::default();
            for block in text_page.blocks() {
                for line in block.lines() {
                    for ch in line.chars() {
                        let Some(c) = ch.char() else { continue };
                        let offset = out.text.len();
                        out.text.push(c);
                        if c.is_whitespace() {
                            continue;
                        }
                        let device = quad_bounds(&ch.quad());
                        out.runs.push(TextRun {
                            text: c.to_string(),
                            offset,
                            rect: geometry.from_device(&device),
                        });
                    }
                    out.text.push('\n');
                }
            }
            Ok(out)
        })
    }

    /// Glyphs whose centre lies inside `region`
    ///
    /// `region` is top-down device space at `dpi`; lines are joined by `\n`.
    pub fn text_in_region(&self, page: usize, region: &Rect, dpi: f64) -> Result<String> {
        let scale = 72.0 / dpi;
        let bounds = Rect::new(
            region.x0 * scale,
            region.y0 * scale,
            region.x1 * scale,
            region.y1 * scale,
        );
        
        self.with_page(page, |p| {
            let text_page = p
                .to_text_page(TextPageOptions::empty())
                .map_err(|e| ExtractError::TextExtraction(e.to_string()))?;

            let mut out = String::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    let mut line_text = String::new();
                    for ch in line.chars() {
                        let Some(c) = ch.char() else { continue };
                        let glyph = quad_bounds(&ch.quad());
                        let cx = (glyph.x0 + glyph.x1) / 2.0;
                        let cy = (glyph.y0 + glyph.y1) / 2.0;
                        if cx >= bounds.x0 && cx <= bounds.x1 && cy >= bounds.y0 && cy <= bounds.y1 {
                            line_text.push(c);
                        }
                    }
                    if !line_text.is_empty() {
                        if !out.is_empty() {
                            out.push('\n');
                        }
                        out.push_str(&line_text);
                    }
                }
            }
            Ok(out)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mupdf::Point;

    #[test]
    fn test_quad_bounds_of_skewed_quad() {
        let quad = Quad {
            ul: Point { x: 10.0, y: 20.0 },
            ur: Point { x: 18.0, y: 19.0 },
            ll: Point { x: 11.0, y: 30.0 },
            lr: Point { x: 19.0, y: 29.0 },
        };
        assert_eq!(quad_bounds(&quad), Rect::new(10.0, 19.0, 19.0, 30.0));
    }
}
