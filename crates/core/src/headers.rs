//! Header label normalization.

use sensorclean_sheet::CellValue;

/// Normalize one raw header label.
///
/// Null labels become the empty string. Anything else is rendered as text with
/// newlines turned into spaces, whitespace runs collapsed to one space and the
/// ends trimmed.
pub fn normalize_header(label: &CellValue) -> String {
    match label {
        CellValue::Null => String::new(),
        other => normalize_whitespace(&other.as_str()),
    }
}

/// Normalize a header row, keeping length and order.
pub fn normalize_headers(labels: &[CellValue]) -> Vec<String> {
    labels.iter().map(normalize_header).collect()
}

fn normalize_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newlines_and_runs() {
        assert_eq!(normalize_header(&"Date/\nTime".into()), "Date/ Time");
        assert_eq!(normalize_header(&"  PROBE \r\n  1_C ".into()), "PROBE 1_C");
        assert_eq!(normalize_header(&"a\t\tb".into()), "a b");
    }

    #[test]
    fn test_null_and_non_text_labels() {
        assert_eq!(normalize_header(&CellValue::Null), "");
        assert_eq!(normalize_header(&"   ".into()), "");
        assert_eq!(normalize_header(&CellValue::Int(7)), "7");
    }

    #[test]
    fn test_idempotent() {
        let labels: Vec<CellValue> = vec![
            "S/N".into(),
            " Date\n Time ".into(),
            CellValue::Null,
            "ALARM_  HI".into(),
            CellValue::Float(2.5),
        ];
        let once = normalize_headers(&labels);
        let again: Vec<CellValue> = once.iter().cloned().map(CellValue::from).collect();
        assert_eq!(normalize_headers(&again), once);
        assert_eq!(once.len(), labels.len());
    }
}
