use chrono::{DateTime, NaiveDateTime};
use std::fmt;

/// Serial number of 1970-01-01 in the 1900 date system (origin 1899-12-30).
pub const UNIX_EPOCH_SERIAL: f64 = 25_569.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Represents a cell value in a sheet
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    String(String),
}

impl CellValue {
    /// Check if the value is null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Check if the value is null or text made only of whitespace
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Try to get the value as a finite float.
    ///
    /// Text is trimmed before parsing; booleans count as 1.0 / 0.0.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        let value = match self {
            CellValue::Float(f) => *f,
            CellValue::Int(i) => *i as f64,
            CellValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            CellValue::String(s) => s.trim().parse().ok()?,
            CellValue::Null | CellValue::DateTime(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Get the value as a timestamp, if it already is one
    #[must_use]
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Get the value as a string
    #[must_use]
    pub fn as_str(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::String(s) => s.clone(),
        }
    }
}

/// Convert a spreadsheet serial date (days since 1899-12-30) to a timestamp.
///
/// The fractional part is the time of day, rounded to the millisecond.
/// Returns `None` for non-finite or out-of-range serials.
#[must_use]
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let millis = ((serial - UNIX_EPOCH_SERIAL) * MILLIS_PER_DAY).round();
    if millis.abs() >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64).map(|dt| dt.naive_utc())
}

/// Convert a timestamp to a spreadsheet serial date (days since 1899-12-30).
#[must_use]
pub fn datetime_to_serial(dt: NaiveDateTime) -> f64 {
    UNIX_EPOCH_SERIAL + dt.and_utc().timestamp_millis() as f64 / MILLIS_PER_DAY
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Null
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, ""),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(fl) => write!(f, "{fl}"),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CellValue::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_blank() {
        assert!(CellValue::Null.is_blank());
        assert!(CellValue::from("   ").is_blank());
        assert!(!CellValue::from("x").is_blank());
        assert!(!CellValue::Int(0).is_blank());
    }

    #[test]
    fn test_as_float() {
        assert_eq!(CellValue::Int(42).as_float(), Some(42.0));
        assert_eq!(CellValue::from(" 2.5 ").as_float(), Some(2.5));
        assert_eq!(CellValue::Bool(true).as_float(), Some(1.0));
        assert_eq!(CellValue::from("N/A").as_float(), None);
        assert_eq!(CellValue::from("NaN").as_float(), None);
        assert_eq!(CellValue::Float(f64::NAN).as_float(), None);
        assert_eq!(CellValue::Null.as_float(), None);
    }

    #[test]
    fn test_serial_to_datetime() {
        assert_eq!(serial_to_datetime(44200.0), Some(ymd_hms(2021, 1, 4, 0, 0, 0)));
        assert_eq!(serial_to_datetime(44200.5), Some(ymd_hms(2021, 1, 4, 12, 0, 0)));
        assert_eq!(serial_to_datetime(0.0), Some(ymd_hms(1899, 12, 30, 0, 0, 0)));
        assert_eq!(serial_to_datetime(f64::NAN), None);
        assert_eq!(serial_to_datetime(1e300), None);
    }

    #[test]
    fn test_datetime_to_serial() {
        assert!((datetime_to_serial(ymd_hms(2021, 1, 4, 6, 0, 0)) - 44200.25).abs() < 1e-9);
    }

    #[test]
    fn test_display_datetime() {
        let cell = CellValue::from(ymd_hms(2024, 3, 1, 8, 5, 0));
        assert_eq!(cell.to_string(), "2024-03-01 08:05:00");
        assert_eq!(cell.as_str(), "2024-03-01 08:05:00");
    }
}
