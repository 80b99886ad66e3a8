//! Page labels
//!
//! Rebuilds author-defined page numbering ("iv", "A-3", ...) from the ranges
//! stored in a document's `/PageLabels` number tree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Largest value rendered as roman numerals; larger values fall back to arabic
const MAX_ROMAN: i64 = 3999;

/// Numbering style (`/S` entry of a label dictionary)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelStyle {
    /// `D`
    Decimal,
    /// `R`
    UpperRoman,
    /// `r`
    LowerRoman,
    /// `A`
    UpperAlpha,
    /// `a`
    LowerAlpha,
}

impl LabelStyle {
    pub fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"D" => Some(Self::Decimal),
            b"R" => Some(Self::UpperRoman),
            b"r" => Some(Self::LowerRoman),
            b"A" => Some(Self::UpperAlpha),
            b"a" => Some(Self::LowerAlpha),
            _ => None,
        }
    }

    pub fn format(self, number: i64) -> String {
        match self {
            Self::Decimal => number.to_string(),
            Self::UpperRoman => to_roman(number),
            Self::LowerRoman => to_roman(number).to_lowercase(),
            Self::UpperAlpha => to_alpha(number).to_uppercase(),
            Self::LowerAlpha => to_alpha(number),
        }
    }
}

/// One entry of the label number tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLabelRange {
    /// Zero-based index of the first page in the range
    pub start: usize,
    /// `None` means the label is the prefix alone
    pub style: Option<LabelStyle>,
    pub prefix: String,
    /// Numeric value of the first page in the range (`/St`, default 1)
    pub first: i64,
}

impl PageLabelRange {
    pub fn new(start: usize, style: Option<LabelStyle>) -> Self {
        Self {
            start,
            style,
            prefix: String::new(),
            first: 1,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_first(mut self, first: i64) -> Self {
        self.first = first;
        self
    }

    /// Label of the page `counter` pages after the start of this range
    fn label(&self, counter: usize) -> String {
        let number = match self.style {
            Some(style) => style.format(self.first + counter as i64),
            None => String::new(),
        };
        format!("{}{}", self.prefix, number)
    }
}

/// Roman numerals, uppercase; arabic outside `1..=3999`
pub fn to_roman(number: i64) -> String {
    if !(1..=MAX_ROMAN).contains(&number) {
        return number.to_string();
    }
    const TABLE: [(i64, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut remaining = number;
    let mut roman = String::new();
    for (value, digits) in TABLE {
        while remaining >= value {
            roman.push_str(digits);
            remaining -= value;
        }
    }
    roman
}

/// Alphabetic labels, lowercase: a..z, aa..zz, aaa..
pub fn to_alpha(number: i64) -> String {
    if number < 1 {
        return number.to_string();
    }
    let letter = (b'a' + ((number - 1) % 26) as u8) as char;
    let repeat = ((number - 1) / 26 + 1) as usize;
    std::iter::repeat(letter).take(repeat).collect()
}

/// Resolved labels for every page of a document
#[derive(Debug, Clone, Default)]
pub struct PageLabels {
    labels: Option<BTreeMap<usize, String>>,
}

impl PageLabels {
    /// Walk the ranges in page order, resetting the counter at each range start
    ///
    /// `None` ranges (no label tree) produce no labels at all.
    pub fn resolve(ranges: Option<&[PageLabelRange]>, page_count: usize) -> Self {
        let Some(ranges) = ranges else {
            return Self::default();
        };

        let mut by_start: BTreeMap<usize, &PageLabelRange> = BTreeMap::new();
        for range in ranges {
            by_start.insert(range.start, range);
        }

        let mut labels = BTreeMap::new();
        let mut current: Option<&PageLabelRange> = None;
        let mut counter = 0usize;
        for page in 0..page_count {
            if let Some(range) = by_start.get(&page) {
                current = Some(range);
                counter = 0;
            }
            if let Some(range) = current {
                let label = range.label(counter);
                if !label.is_empty() {
                    labels.insert(page, label);
                }
            }
            counter += 1;
        }

        Self {
            labels: Some(labels),
        }
    }

    pub fn get(&self, page_index: usize) -> Option<&str> {
        self.labels.as_ref()?.get(&page_index).map(String::as_str)
    }

    /// Display label, falling back to the 1-based physical page number
    pub fn label_or_number(&self, page_index: usize) -> String {
        self.get(page_index)
            .map(str::to_string)
            .unwrap_or_else(|| (page_index + 1).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roman() {
        assert_eq!(to_roman(1), "I");
        assert_eq!(to_roman(4), "IV");
        assert_eq!(to_roman(14), "XIV");
        assert_eq!(to_roman(1994), "MCMXCIV");
        assert_eq!(to_roman(3999), "MMMCMXCIX");
        assert_eq!(to_roman(4000), "4000");
    }

    #[test]
    fn test_alpha_wraps_after_z() {
        assert_eq!(to_alpha(1), "a");
        assert_eq!(to_alpha(26), "z");
        assert_eq!(to_alpha(27), "aa");
        assert_eq!(to_alpha(28), "bb");
        assert_eq!(to_alpha(53), "aaa");
    }

    #[test]
    fn test_lower_roman_front_matter() {
        let ranges = vec![PageLabelRange::new(0, Some(LabelStyle::LowerRoman))];
        let labels = PageLabels::resolve(Some(&ranges), 3);
        assert_eq!(labels.get(0), Some("i"));
        assert_eq!(labels.get(1), Some("ii"));
        assert_eq!(labels.get(2), Some("iii"));
    }

    #[test]
    fn test_range_reset_with_prefix_and_start() {
        let ranges = vec![
            PageLabelRange::new(0, Some(LabelStyle::LowerRoman)),
            PageLabelRange::new(5, Some(LabelStyle::Decimal))
                .with_prefix("A-")
                .with_first(5),
        ];
        let labels = PageLabels::resolve(Some(&ranges), 8);
        assert_eq!(labels.get(4), Some("v"));
        assert_eq!(labels.get(5), Some("A-5"));
        assert_eq!(labels.get(6), Some("A-6"));
        assert_eq!(labels.get(7), Some("A-7"));
    }

    #[test]
    fn test_alpha_and_prefix_only_ranges() {
        let ranges = vec![
            PageLabelRange::new(0, None).with_prefix("Cover"),
            PageLabelRange::new(1, Some(LabelStyle::UpperAlpha)),
        ];
        let labels = PageLabels::resolve(Some(&ranges), 3);
        assert_eq!(labels.get(0), Some("Cover"));
        assert_eq!(labels.get(1), Some("A"));
        assert_eq!(labels.get(2), Some("B"));
    }

    #[test]
    fn test_fallback_to_physical_number() {
        let none = PageLabels::resolve(None, 4);
        assert_eq!(none.get(2), None);
        assert_eq!(none.label_or_number(2), "3");

        // Pages before the first range have no label
        let ranges = vec![PageLabelRange::new(2, Some(LabelStyle::Decimal))];
        let labels = PageLabels::resolve(Some(&ranges), 4);
        assert_eq!(labels.label_or_number(0), "1");
        assert_eq!(labels.label_or_number(2), "1");
        assert_eq!(labels.label_or_number(3), "2");
    }
}
