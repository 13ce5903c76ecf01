//! Timestamp coercion for datetime columns.
//!
//! Logger exports carry timestamps either as human-readable text or as
//! spreadsheet serial numbers. Text is tried first, reading ambiguous
//! `D/M` vs `M/D` dates day-first. When more than half of a column fails that
//! pass, the column is read again as serial dates and the gaps are filled.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use sensorclean_sheet::{serial_to_datetime, CellValue};

/// Share of missing text-parse results above which serial dates are tried.
pub const SERIAL_FALLBACK_THRESHOLD: f64 = 0.5;

/// Every numeric layout has a two-digit-year twin listed first, and parses
/// landing before year 100 are rejected, so `24` is never read as the year 24.
const DAY_FIRST_DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%y %H:%M:%S%.f",
    "%d/%m/%y %H:%M",
    "%d/%m/%y %I:%M:%S %p",
    "%d/%m/%y %I:%M %p",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %I:%M:%S %p",
    "%d/%m/%Y %I:%M %p",
    "%d-%m-%y %H:%M:%S%.f",
    "%d-%m-%y %H:%M",
    "%d-%m-%Y %H:%M:%S%.f",
    "%d-%m-%Y %H:%M",
    "%d.%m.%y %H:%M:%S%.f",
    "%d.%m.%y %H:%M",
    "%d.%m.%Y %H:%M:%S%.f",
    "%d.%m.%Y %H:%M",
];

const DAY_FIRST_DATE_FORMATS: &[&str] = &[
    "%d/%m/%y", "%d/%m/%Y", "%d-%m-%y", "%d-%m-%Y", "%d.%m.%y", "%d.%m.%Y",
];

const MONTH_FIRST_DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%y %H:%M:%S%.f",
    "%m/%d/%y %H:%M",
    "%m/%d/%y %I:%M:%S %p",
    "%m/%d/%y %I:%M %p",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m-%d-%y %H:%M:%S%.f",
    "%m-%d-%y %H:%M",
    "%m-%d-%Y %H:%M:%S%.f",
    "%m-%d-%Y %H:%M",
];

const MONTH_FIRST_DATE_FORMATS: &[&str] = &["%m/%d/%y", "%m/%d/%Y", "%m-%d-%y", "%m-%d-%Y"];

/// Earliest year a parsed timestamp may carry.
const MIN_YEAR: i32 = 100;

const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%d %b %Y %H:%M:%S%.f",
    "%d %b %Y %H:%M",
    "%d-%b-%Y %H:%M:%S%.f",
    "%d-%b-%Y %H:%M",
    "%b %d %Y %H:%M:%S%.f",
];

const ISO_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
    "%b %d %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Parse timestamp text, reading ambiguous numeric dates day-first.
///
/// Month-first layouts are only reached when no day-first reading exists
/// (e.g. `12/25/2024`). Offsets in RFC 3339 text are dropped, keeping the
/// written wall-clock time.
pub fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    try_layouts(text, DAY_FIRST_DATETIME_FORMATS, DAY_FIRST_DATE_FORMATS)
        .or_else(|| try_layouts(text, MONTH_FIRST_DATETIME_FORMATS, MONTH_FIRST_DATE_FORMATS))
        .or_else(|| try_layouts(text, ISO_DATETIME_FORMATS, ISO_DATE_FORMATS))
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

fn try_layouts(
    text: &str,
    datetime_formats: &[&str],
    date_formats: &[&str],
) -> Option<NaiveDateTime> {
    datetime_formats
        .iter()
        .filter_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .find(|dt| dt.year() >= MIN_YEAR)
        .or_else(|| {
            date_formats
                .iter()
                .filter_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .find(|date| date.year() >= MIN_YEAR)
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Text stage for a single cell.
///
/// Timestamps pass through, text is parsed, numbers and booleans fail.
pub fn parse_datetime_cell(cell: &CellValue) -> Option<NaiveDateTime> {
    match cell {
        CellValue::DateTime(dt) => Some(*dt),
        CellValue::String(s) => parse_datetime_text(s),
        CellValue::Null | CellValue::Bool(_) | CellValue::Int(_) | CellValue::Float(_) => None,
    }
}

/// Serial stage for a single cell: numbers and numeric text are day offsets
/// from 1899-12-30.
pub fn parse_serial_cell(cell: &CellValue) -> Option<NaiveDateTime> {
    match cell {
        CellValue::Int(_) | CellValue::Float(_) | CellValue::String(_) => {
            cell.as_float().and_then(serial_to_datetime)
        }
        CellValue::Null | CellValue::Bool(_) | CellValue::DateTime(_) => None,
    }
}

/// Coerce a column of raw values to timestamps, one result per input value.
///
/// Never fails; cells that neither stage understands come back as `None`.
pub fn coerce_datetimes(values: &[CellValue]) -> Vec<Option<NaiveDateTime>> {
    let mut parsed: Vec<Option<NaiveDateTime>> = values.iter().map(parse_datetime_cell).collect();
    if parsed.is_empty() {
        return parsed;
    }

    let missing = parsed.iter().filter(|slot| slot.is_none()).count();
    let missing_ratio = missing as f64 / parsed.len() as f64;
    if missing_ratio > SERIAL_FALLBACK_THRESHOLD {
        tracing::debug!(missing, total = parsed.len(), "retrying datetime column as serial dates");
        for (slot, value) in parsed.iter_mut().zip(values) {
            if slot.is_none() {
                *slot = parse_serial_cell(value);
            }
        }
    }

    parsed
}
