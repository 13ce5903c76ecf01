//! Numeric coercion for sensor columns.

use sensorclean_sheet::{CellValue, Sheet};

/// Coerce a single cell to a float reading, or null when it has none.
pub fn coerce_numeric_cell(cell: &CellValue) -> CellValue {
    cell.as_float().map_or(CellValue::Null, CellValue::Float)
}

/// Coerce every column named in `columns` to floats in place.
///
/// Columns are matched by header text and every position carrying a listed
/// name is converted. Names not in the sheet are skipped.
pub fn coerce_numeric(sheet: &mut Sheet, columns: &[String]) {
    let indices: Vec<usize> = sheet
        .column_names()
        .iter()
        .enumerate()
        .filter(|(_, name)| columns.contains(name))
        .map(|(index, _)| index)
        .collect();
    coerce_numeric_at(sheet, &indices);
}

/// Coerce the columns at the given positions in place.
pub(crate) fn coerce_numeric_at(sheet: &mut Sheet, indices: &[usize]) {
    if indices.is_empty() {
        return;
    }

    let mut missing = 0usize;
    for row in sheet.rows_mut() {
        for &index in indices {
            if let Some(cell) = row.get_mut(index) {
                let coerced = coerce_numeric_cell(cell);
                if coerced.is_null() && !cell.is_blank() {
                    missing += 1;
                }
                *cell = coerced;
            }
        }
    }

    tracing::debug!(columns = indices.len(), unparsed = missing, "coerced sensor columns");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_coercion() {
        assert_eq!(coerce_numeric_cell(&CellValue::Int(3)), CellValue::Float(3.0));
        assert_eq!(coerce_numeric_cell(&" 2.5 ".into()), CellValue::Float(2.5));
        assert_eq!(coerce_numeric_cell(&CellValue::Bool(true)), CellValue::Float(1.0));
        assert_eq!(coerce_numeric_cell(&"N/A".into()), CellValue::Null);
        assert_eq!(coerce_numeric_cell(&"NaN".into()), CellValue::Null);
        assert_eq!(coerce_numeric_cell(&CellValue::Float(f64::INFINITY)), CellValue::Null);
        assert_eq!(coerce_numeric_cell(&CellValue::Null), CellValue::Null);
    }

    #[test]
    fn test_not_available_becomes_missing() {
        let mut sheet = Sheet::from_data(vec![
            vec![CellValue::from("PROBE_C"), CellValue::from("note")],
            vec![CellValue::from("1.5"), CellValue::from("N/A")],
            vec![CellValue::from("N/A"), CellValue::from("ok")],
            vec![CellValue::Int(4), CellValue::from("x")],
        ]);
        coerce_numeric(&mut sheet, &["PROBE_C".to_string()]);

        assert_eq!(
            sheet.column(0).unwrap(),
            vec![CellValue::Float(1.5), CellValue::Null, CellValue::Float(4.0)]
        );
        // untouched column keeps its text
        assert_eq!(sheet.get(0, 1).unwrap(), &CellValue::from("N/A"));
    }

    #[test]
    fn test_unknown_and_duplicate_columns() {
        let mut sheet = Sheet::from_data(vec![vec!["A_C", "b", "A_C"], vec!["1", "2", "3"]]);
        coerce_numeric(&mut sheet, &["A_C".to_string(), "missing".to_string()]);
        assert_eq!(sheet.get(0, 0).unwrap(), &CellValue::Float(1.0));
        assert_eq!(sheet.get(0, 1).unwrap(), &CellValue::from("2"));
        assert_eq!(sheet.get(0, 2).unwrap(), &CellValue::Float(3.0));
    }
}
