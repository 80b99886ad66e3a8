//! Annotation Matching Benchmarks
//!
//! Quad-to-run matching and fallback text reconstruction on a dense
//! synthetic page (60 lines of 90 glyphs).
//!
//! Run with: `cargo bench --bench annotation_matching`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use pdf_annots::backend::{PageText, TextRun};
use pdf_annots::geometry::{match_quads, quad_rects, MatchConfig, PageGeometry, Rect, Rotation};
use pdf_annots::text::{condense_spaces, resolver::fallback_segment, FallbackPolicy};

const LINES: usize = 60;
const GLYPHS_PER_LINE: usize = 90;

/// Monospaced page: 5pt advance, 12pt line pitch, a space every 6th glyph
fn dense_page() -> PageText {
    let mut text = String::new();
    let mut runs = Vec::new();
    for line in 0..LINES {
        let y = 760.0 - line as f64 * 12.0;
        for column in 0..GLYPHS_PER_LINE {
            let offset = text.len();
            if column % 6 == 5 {
                text.push(' ');
                continue;
            }
            let c = (b'a' + (column % 26) as u8) as char;
            text.push(c);
            let x = 40.0 + column as f64 * 5.0;
            runs.push(TextRun {
                text: c.to_string(),
                offset,
                rect: Rect::new(x, y, x + 4.5, y + 10.0),
            });
        }
        text.push('\n');
    }
    PageText { text, runs }
}

/// QuadPoints covering `lines` consecutive lines starting at line 10
fn quad_points(lines: usize) -> Vec<f64> {
    (0..lines)
        .flat_map(|i| {
            let top = 760.0 - (10 + i) as f64 * 12.0 + 11.0;
            let bottom = top - 12.0;
            [40.0, top, 490.0, top, 40.0, bottom, 490.0, bottom]
        })
        .collect()
}

fn bench_match_quads(c: &mut Criterion) {
    let page = dense_page();
    let config = MatchConfig::default();

    let mut group = c.benchmark_group("match_quads");
    group.measurement_time(Duration::from_secs(5));

    for lines in [1usize, 5, 20] {
        let quads = quad_rects(&quad_points(lines));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &quads, |b, quads| {
            b.iter(|| black_box(match_quads(black_box(quads), &page.runs, &config)))
        });
    }

    group.finish();
}

fn bench_fallback_text(c: &mut Criterion) {
    let page = dense_page();
    let quads = quad_rects(&quad_points(5));
    let regions = match_quads(&quads, &page.runs, &MatchConfig::default()).unwrap_or_default();
    let policy = FallbackPolicy::default();

    c.bench_function("fallback_reconstruction_5_lines", |b| {
        b.iter(|| {
            let fallback: String = regions
                .iter()
                .map(|region| fallback_segment(&page, region))
                .collect::<Vec<_>>()
                .join(" ");
            let choice = policy.choose(black_box("\u{fffd}\u{fffd}\u{fffd}"), &fallback);
            black_box((condense_spaces(&fallback), choice))
        })
    });
}

fn bench_device_transform(c: &mut Criterion) {
    let geometry = PageGeometry::new(
        Rect::new(0.0, 0.0, 612.0, 792.0),
        Some(Rect::new(18.0, 18.0, 594.0, 774.0)),
        Rotation::Deg90,
    );
    let rect = Rect::new(72.0, 600.0, 300.0, 612.0);

    c.bench_function("to_device_round_trip", |b| {
        b.iter(|| {
            let device = geometry.to_device(black_box(&rect));
            black_box(geometry.from_device(&device))
        })
    });
}

criterion_group!(benches, bench_match_quads, bench_fallback_text, bench_device_transform);
criterion_main!(benches);
