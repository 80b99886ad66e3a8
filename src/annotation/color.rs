//! Annotation colours: hex strings and coarse named buckets

use serde::{Deserialize, Serialize};

/// Named colour bucket derived from HSL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorCategory {
    Black,
    White,
    Gray,
    Red,
    Orange,
    Yellow,
    Green,
    Cyan,
    Blue,
    Purple,
    Magenta,
}

/// Interpret a `/C` array as RGB in `0.0..=1.0`
///
/// One component is gray, three RGB, four CMYK. Empty arrays mean
/// "transparent" and yield `None`, as does any other length.
pub fn rgb_components(values: &[f64]) -> Option<[f64; 3]> {
    let clamp = |v: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
    match values {
        [g] => Some([clamp(*g); 3]),
        [r, g, b] => Some([clamp(*r), clamp(*g), clamp(*b)]),
        [c, m, y, k] => {
            let k = clamp(*k);
            Some([
                (1.0 - clamp(*c)) * (1.0 - k),
                (1.0 - clamp(*m)) * (1.0 - k),
                (1.0 - clamp(*y)) * (1.0 - k),
            ])
        }
        _ => None,
    }
}

/// `#rrggbb`, each channel truncated from `c * 255`
pub fn to_hex(rgb: [f64; 3]) -> String {
    let [r, g, b] = rgb.map(|c| (c * 255.0) as u8);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Hue in degrees `[0, 360)`, saturation and lightness in `[0, 1]`
pub fn to_hsl(rgb: [f64; 3]) -> (f64, f64, f64) {
    let [r, g, b] = rgb;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if max == min {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l < 0.5 { d / (max + min) } else { d / (2.0 - max - min) };
    let mut h = if max == r {
        (g - b) / d
    } else if max == g {
        2.0 + (b - r) / d
    } else {
        4.0 + (r - g) / d
    };
    h *= 60.0;
    if h < 0.0 {
        h += 360.0;
    }
    (h, s, l)
}

pub fn categorize(rgb: [f64; 3]) -> ColorCategory {
    let (h, s, l) = to_hsl(rgb);

    if l < 0.12 {
        return ColorCategory::Black;
    }
    if l > 0.98 {
        return ColorCategory::White;
    }
    if s < 0.2 {
        return ColorCategory::Gray;
    }

    match h {
        h if h < 15.0 => ColorCategory::Red,
        h if h < 45.0 => ColorCategory::Orange,
        h if h < 65.0 => ColorCategory::Yellow,
        h if h < 170.0 => ColorCategory::Green,
        h if h < 190.0 => ColorCategory::Cyan,
        h if h < 263.0 => ColorCategory::Blue,
        h if h < 280.0 => ColorCategory::Purple,
        h if h < 335.0 => ColorCategory::Magenta,
        _ => ColorCategory::Red,
    }
}
