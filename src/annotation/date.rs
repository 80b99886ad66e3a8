//! PDF date strings
//!
//! `D:YYYYMMDDHHmmSSOHH'mm'` where every component after the year is
//! optional and `O` is `+`, `-` or `Z`. Apostrophes are stripped first, so
//! `+01'00'`, `+0100` and `Z00'00'` all parse.

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, TimeZone};

/// Parse a PDF date; `None` for anything unrecognised
pub fn parse_pdf_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != '\'').collect();
    let body = cleaned.strip_prefix("D:").unwrap_or(&cleaned);

    let digits_len = body.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len < 4 {
        return None;
    }
    let digits_len = digits_len.min(14);
    let (digits, zone) = body.split_at(digits_len);

    // Missing components default to January 1st, midnight
    const DEFAULTS: &str = "00000101000000";
    let padded = format!("{}{}", digits, &DEFAULTS[digits_len..]);
    let naive = NaiveDateTime::parse_from_str(&padded, "%Y%m%d%H%M%S").ok()?;

    let offset = parse_offset(zone)?;
    offset.from_local_datetime(&naive).single()
}

/// `""`, `Z...`, `+HH`, `+HHmm`, `-HHmm`
fn parse_offset(zone: &str) -> Option<FixedOffset> {
    let sign = match zone.chars().next() {
        None | Some('Z') | Some('z') => return FixedOffset::east_opt(0),
        Some('+') => 1,
        Some('-') => -1,
        Some(_) => return None,
    };
    let rest = &zone[1..];
    if !rest.bytes().all(|b| b.is_ascii_digit()) || !(rest.len() == 2 || rest.len() == 4) {
        return None;
    }
    let hours: i32 = rest[..2].parse().ok()?;
    let minutes: i32 = if rest.len() == 4 { rest[2..].parse().ok()? } else { 0 };
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// RFC 3339 with second precision, `Z` for UTC
pub fn format_date(date: &DateTime<FixedOffset>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(raw: &str) -> Option<String> {
        parse_pdf_date(raw).map(|d| format_date(&d))
    }

    #[test]
    fn test_offset_with_apostrophes() {
        assert_eq!(
            roundtrip("D:20220114143015+01'00'").as_deref(),
            Some("2022-01-14T14:30:15+01:00")
        );
        assert_eq!(
            roundtrip("D:20220114143015-05'30'").as_deref(),
            Some("2022-01-14T14:30:15-05:30")
        );
    }

    #[test]
    fn test_utc_variants() {
        for raw in [
            "D:20220114143015Z",
            "D:20220114143015Z00'00'",
            "D:20220114143015",
            "20220114143015Z",
        ] {
            assert_eq!(roundtrip(raw).as_deref(), Some("2022-01-14T14:30:15Z"), "{raw}");
        }
    }

    #[test]
    fn test_partial_dates() {
        assert_eq!(roundtrip("D:2021").as_deref(), Some("2021-01-01T00:00:00Z"));
        assert_eq!(roundtrip("D:202103").as_deref(), Some("2021-03-01T00:00:00Z"));
        assert_eq!(roundtrip("D:20210305+02").as_deref(), Some("2021-03-05T00:00:00+02:00"));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_pdf_date(""), None);
        assert_eq!(parse_pdf_date("yesterday"), None);
        assert_eq!(parse_pdf_date("D:20221399000000"), None);
        assert_eq!(parse_pdf_date("D:20220114143015+1"), None);
    }

    #[test]
    fn test_ordering_across_offsets() {
        let early = parse_pdf_date("D:20220114140000+01'00'").unwrap();
        let late = parse_pdf_date("D:20220114133000Z").unwrap();
        assert!(early < late);
    }
}
