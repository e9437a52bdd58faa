//! Cell canonicalization for key comparison.
//!
//! Normalization is total: every `CellValue` maps to a string, there is no
//! error path.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sheetmerge_engine::CellValue;

/// Characters dropped outright (not replaced by a space).
const STRIPPED: [char; 4] = [',', '.', '-', '_'];

const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Canonical comparison key for one cell.
///
/// - `Empty` → `""`
/// - date-times → `YYYY-MM-DD` (time of day discarded)
/// - text that reads as an ISO date/date-time → same as the date
/// - everything else → [`normalize_text`] of its display form
pub fn normalize(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::DateTime(dt) => date_key(dt.date()),
        CellValue::Text(s) => match parse_iso_date(s.trim()) {
            Some(date) => date_key(date),
            None => normalize_text(s),
        },
        other => normalize_text(&other.display()),
    }
}

/// Lower-case, drop `, . - _`, collapse whitespace runs to one space, trim.
pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;

    for ch in raw.chars() {
        if STRIPPED.contains(&ch) {
            continue;
        }
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.extend(ch.to_lowercase());
    }

    out
}

fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Calendar date of an ISO-8601 style date or date-time string.
fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    // Cheap shape check first: every accepted form starts with `dddd-`.
    let bytes = s.as_bytes();
    if bytes.len() < 8 || !bytes[..4].iter().all(u8::is_ascii_digit) || bytes[4] != b'-' {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Some(date);
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}
