//! Column classification: which column holds timestamps, which hold sensor
//! readings.

use crate::datetime::parse_datetime_cell;
use crate::error::{CleanError, CleanResult};
use crate::headers::normalize_headers;
use regex::{Regex, RegexBuilder};
use sensorclean_sheet::{CellValue, Sheet};
use serde::Serialize;
use std::fmt;

/// Headers starting with `ALARM_` or ending with `_C`.
pub const DEFAULT_SENSOR_PATTERN: &str = r"^(ALARM_|.*_C$)";

/// Known non-sensor headers, compared case-insensitively.
pub const META_COLUMNS: &[&str] = &[
    "S/N",
    "S N",
    "SN",
    "Date/Time",
    "Date Time",
    "Datetime",
    "Date",
    "Time",
    "Days",
];

/// Datetime header names in priority order, compared case-insensitively.
pub const DATETIME_CANDIDATES: &[&str] =
    &["Date/Time", "Date Time", "Datetime", "Timestamp", "Date"];

/// Share of non-empty values that must parse as dates for the content-based
/// fallback to accept a column (strictly greater than).
pub const DATETIME_DETECTION_THRESHOLD: f64 = 0.7;

/// Role of a column within one classification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Datetime,
    Sensor,
    Meta,
    Unclassified,
}

/// Compiled, case-insensitive sensor header pattern.
///
/// Matching is an unanchored search unless the pattern anchors itself.
#[derive(Debug, Clone)]
pub struct SensorPattern {
    source: String,
    regex: Regex,
}

impl SensorPattern {
    /// Compile a sensor header pattern.
    pub fn new(pattern: &str) -> CleanResult<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| CleanError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as supplied
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check whether the pattern matches anywhere in the header
    pub fn is_match(&self, header: &str) -> bool {
        self.regex.is_match(header)
    }
}

impl fmt::Display for SensorPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Check a normalized header against the meta column set.
pub fn is_meta_column(header: &str) -> bool {
    let lower = header.to_lowercase();
    META_COLUMNS.iter().any(|meta| meta.to_lowercase() == lower)
}

fn is_sensor_header(header: &str, pattern: &SensorPattern) -> bool {
    !is_meta_column(header) && pattern.is_match(header)
}

/// Sensor columns in table order; a repeated header appears once per position.
pub fn detect_sensor_columns(headers: &[String], pattern: &SensorPattern) -> Vec<String> {
    headers
        .iter()
        .filter(|header| is_sensor_header(header, pattern))
        .cloned()
        .collect()
}

/// Position of the datetime column, if any.
///
/// Header names are checked first, candidate by candidate in priority order.
/// Failing that, the first column whose non-empty values parse as dates more
/// than [`DATETIME_DETECTION_THRESHOLD`] of the time is chosen.
pub fn find_datetime_column_index(sheet: &Sheet) -> Option<usize> {
    let headers = normalize_headers(sheet.header());

    for candidate in DATETIME_CANDIDATES {
        let candidate = candidate.to_lowercase();
        if let Some(index) = headers.iter().position(|h| h.to_lowercase() == candidate) {
            tracing::debug!(column = %headers[index], "datetime column matched by name");
            return Some(index);
        }
    }

    let index = (0..sheet.col_count()).find(|&index| {
        let ratio = date_parse_ratio(sheet.rows().map(|row| &row[index]));
        ratio > DATETIME_DETECTION_THRESHOLD
    });
    if let Some(index) = index {
        tracing::debug!(column = %headers[index], "datetime column detected from contents");
    }
    index
}

/// Normalized name of the datetime column, if any. See [`find_datetime_column_index`].
pub fn find_datetime_column(sheet: &Sheet) -> Option<String> {
    find_datetime_column_index(sheet)
        .map(|index| normalize_headers(sheet.header()).swap_remove(index))
}

/// Share of non-empty cells that parse as dates; zero when all are empty.
fn date_parse_ratio<'a>(cells: impl Iterator<Item = &'a CellValue>) -> f64 {
    let mut non_empty = 0usize;
    let mut parsed = 0usize;
    for cell in cells.filter(|cell| !cell.is_blank()) {
        non_empty += 1;
        if parse_datetime_cell(cell).is_some() {
            parsed += 1;
        }
    }
    if non_empty == 0 {
        0.0
    } else {
        parsed as f64 / non_empty as f64
    }
}

/// Assign exactly one role to every header.
///
/// The datetime column wins over every other role, then meta names, then the
/// sensor pattern.
pub fn classify_columns(
    headers: &[String],
    datetime_index: Option<usize>,
    pattern: &SensorPattern,
) -> Vec<ColumnRole> {
    headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            if datetime_index == Some(index) {
                ColumnRole::Datetime
            } else if is_meta_column(header) {
                ColumnRole::Meta
            } else if pattern.is_match(header) {
                ColumnRole::Sensor
            } else {
                ColumnRole::Unclassified
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn default_pattern() -> SensorPattern {
        SensorPattern::new(DEFAULT_SENSOR_PATTERN).unwrap()
    }

    #[test]
    fn test_default_pattern() {
        let found = detect_sensor_columns(
            &headers(&["ALARM_TEMP", "PROBE_1_C", "Date/Time", "Days", "SN", "Notes"]),
            &default_pattern(),
        );
        assert_eq!(found, headers(&["ALARM_TEMP", "PROBE_1_C"]));
    }

    #[test]
    fn test_case_insensitive_pattern_and_meta() {
        let found = detect_sensor_columns(
            &headers(&["alarm_low", "probe_c", "sn", "DAYS"]),
            &default_pattern(),
        );
        assert_eq!(found, headers(&["alarm_low", "probe_c"]));
    }

    #[test]
    fn test_meta_excluded_even_when_pattern_matches() {
        let everything = SensorPattern::new(".*").unwrap();
        let found = detect_sensor_columns(
            &headers(&["S/N", "S N", "Time", "date time", "Reading"]),
            &everything,
        );
        assert_eq!(found, headers(&["Reading"]));
    }

    #[test]
    fn test_unanchored_search_and_duplicates() {
        let pattern = SensorPattern::new("temp").unwrap();
        let found = detect_sensor_columns(&headers(&["Tank TEMP 1", "x", "Tank TEMP 1"]), &pattern);
        assert_eq!(found, headers(&["Tank TEMP 1", "Tank TEMP 1"]));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = SensorPattern::new("(unclosed").unwrap_err();
        assert!(matches!(
            err,
            CleanError::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"
        ));
    }

    #[test]
    fn test_datetime_candidate_priority() {
        let sheet = Sheet::from_data(vec![vec!["date", "TIMESTAMP", "x"], vec!["", "", ""]]);
        assert_eq!(find_datetime_column(&sheet).as_deref(), Some("TIMESTAMP"));

        let sheet = Sheet::from_data(vec![vec!["Date", "Datetime"], vec!["", ""]]);
        assert_eq!(find_datetime_column(&sheet).as_deref(), Some("Datetime"));
    }

    #[test]
    fn test_datetime_content_fallback() {
        let sheet = Sheet::from_data(vec![
            vec!["id", "logged", "other"],
            vec!["1", "01/02/2024", "02/02/2024"],
            vec!["2", "02/02/2024", "x"],
            vec!["3", "", "y"],
            vec!["4", "03/02/2024", "z"],
        ]);
        assert_eq!(find_datetime_column_index(&sheet), Some(1));
    }

    #[test]
    fn test_datetime_fallback_threshold_is_strict() {
        // 7 of 10 non-empty values parse: exactly 0.7 does not qualify
        let mut rows = vec![vec!["when".to_string()]];
        rows.extend((1..=7).map(|d| vec![format!("{d:02}/01/2024")]));
        rows.extend((0..3).map(|_| vec!["n/a".to_string()]));
        let sheet = Sheet::from_data(rows);
        assert_eq!(find_datetime_column(&sheet), None);
    }

    #[test]
    fn test_datetime_candidate_uses_normalized_headers() {
        let sheet = Sheet::from_data(vec![vec!["id", " date\n time "], vec!["1", "x"]]);
        assert_eq!(find_datetime_column(&sheet).as_deref(), Some("date time"));
    }

    #[test]
    fn test_no_datetime_column() {
        let sheet = Sheet::from_data(vec![vec!["a", "b"], vec!["1", "x"], vec!["", ""]]);
        assert_eq!(find_datetime_column(&sheet), None);
    }

    #[test]
    fn test_classify_columns_exclusive() {
        let roles = classify_columns(
            &headers(&["SN", "Date/Time", "ALARM_HI", "note"]),
            Some(1),
            &default_pattern(),
        );
        assert_eq!(
            roles,
            vec![
                ColumnRole::Meta,
                ColumnRole::Datetime,
                ColumnRole::Sensor,
                ColumnRole::Unclassified
            ]
        );
    }
}
