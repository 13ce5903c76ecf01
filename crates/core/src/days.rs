//! Elapsed-days column derived from the datetime column.

use crate::datetime::coerce_datetimes;
use chrono::{NaiveDateTime, NaiveTime};
use sensorclean_sheet::{CellValue, Sheet};

/// Header of the derived elapsed-days column.
pub const DAYS_COLUMN: &str = "Days";

const SECONDS_PER_DAY: f64 = 86_400.0;
const NANOS_PER_DAY: f64 = 86_400e9;

/// Insert a `Days` column holding fractional days since midnight of the first
/// timestamp in `datetime_column`.
///
/// Any existing `Days` columns are replaced. The new column goes right after
/// `insert_after` when that column exists, otherwise right after the datetime
/// column, otherwise at the end. Nothing changes when the datetime column is
/// absent or holds no timestamps.
pub fn derive_days(sheet: &mut Sheet, datetime_column: Option<&str>, insert_after: Option<&str>) {
    let Some(name) = datetime_column else {
        return;
    };
    let Ok(index) = sheet.column_index_by_name(name) else {
        tracing::debug!(column = name, "datetime column not in sheet, skipping days");
        return;
    };
    derive_days_at(sheet, index, insert_after);
}

/// Positional form of [`derive_days`].
///
/// Returns the position of the datetime column after the rewrite, or `None`
/// when the column was removed or nothing was derived.
pub(crate) fn derive_days_at(
    sheet: &mut Sheet,
    datetime_index: usize,
    insert_after: Option<&str>,
) -> Option<usize> {
    if datetime_index >= sheet.col_count() {
        return None;
    }

    let (timestamps, coerced) = read_timestamps(sheet, datetime_index);
    let Some(baseline) = timestamps
        .iter()
        .flatten()
        .next()
        .map(|first| first.date().and_time(NaiveTime::MIN))
    else {
        tracing::debug!("datetime column has no timestamps, skipping days");
        return None;
    };

    if coerced {
        for (row, slot) in sheet.rows_mut().zip(&timestamps) {
            row[datetime_index] = slot.map_or(CellValue::Null, CellValue::DateTime);
        }
    }

    let days: Vec<CellValue> = timestamps
        .iter()
        .map(|slot| {
            slot.map_or(CellValue::Null, |ts| CellValue::Float(elapsed_days(baseline, ts)))
        })
        .collect();

    let stale = sheet.column_delete_all_by_name(DAYS_COLUMN);
    let datetime_index = if stale.contains(&datetime_index) {
        None
    } else {
        Some(datetime_index - stale.iter().filter(|&&index| index < datetime_index).count())
    };
    if !stale.is_empty() {
        tracing::debug!(removed = stale.len(), "replaced existing Days columns");
    }

    let anchor = insert_after
        .and_then(|name| sheet.column_index_by_name(name).ok())
        .or(datetime_index);
    let position = anchor.map_or(sheet.col_count(), |index| index + 1);

    if let Err(err) = sheet.column_insert(position, DAYS_COLUMN, days) {
        tracing::warn!(error = %err, "could not insert Days column");
        return datetime_index;
    }

    datetime_index.map(|index| if index >= position { index + 1 } else { index })
}

/// Read the datetime column as timestamps. The flag is set when the column
/// held anything other than timestamps and nulls and had to be coerced.
fn read_timestamps(sheet: &Sheet, index: usize) -> (Vec<Option<NaiveDateTime>>, bool) {
    let values: Vec<CellValue> = sheet.rows().map(|row| row[index].clone()).collect();
    let native = values
        .iter()
        .all(|cell| matches!(cell, CellValue::DateTime(_) | CellValue::Null));
    if native {
        (values.iter().map(CellValue::as_datetime).collect(), false)
    } else {
        (coerce_datetimes(&values), true)
    }
}

fn elapsed_days(baseline: NaiveDateTime, ts: NaiveDateTime) -> f64 {
    let delta = ts - baseline;
    delta.num_seconds() as f64 / SECONDS_PER_DAY + f64::from(delta.subsec_nanos()) / NANOS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> CellValue {
        CellValue::DateTime(
            NaiveDate::from_ymd_opt(2024, 3, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap(),
        )
    }

    fn daily_sheet() -> Sheet {
        Sheet::from_data(vec![
            vec![CellValue::from("Date/Time"), CellValue::from("PROBE_C")],
            vec![at(1, 0), CellValue::Float(1.0)],
            vec![at(2, 0), CellValue::Float(2.0)],
            vec![at(4, 0), CellValue::Float(3.0)],
        ])
    }

    #[test]
    fn test_days_from_midnight() {
        let mut sheet = daily_sheet();
        derive_days(&mut sheet, Some("Date/Time"), None);

        assert_eq!(sheet.column_names(), vec!["Date/Time", "Days", "PROBE_C"]);
        assert_eq!(
            sheet.column_by_name("Days").unwrap(),
            vec![CellValue::Float(0.0), CellValue::Float(1.0), CellValue::Float(3.0)]
        );
    }

    #[test]
    fn test_baseline_is_midnight_of_first_timestamp() {
        let mut sheet = Sheet::from_data(vec![
            vec![CellValue::from("Date/Time")],
            vec![CellValue::Null],
            vec![at(1, 6)],
            vec![at(1, 18)],
        ]);
        derive_days(&mut sheet, Some("Date/Time"), None);

        assert_eq!(
            sheet.column_by_name("Days").unwrap(),
            vec![CellValue::Null, CellValue::Float(0.25), CellValue::Float(0.75)]
        );
    }

    #[test]
    fn test_twice_gives_one_days_column() {
        let mut sheet = daily_sheet();
        derive_days(&mut sheet, Some("Date/Time"), None);
        let first = sheet.clone();
        derive_days(&mut sheet, Some("Date/Time"), None);

        assert_eq!(sheet, first);
        assert_eq!(sheet.column_names().iter().filter(|n| *n == DAYS_COLUMN).count(), 1);
    }

    #[test]
    fn test_insert_after_wins_when_present() {
        let mut sheet = daily_sheet();
        derive_days(&mut sheet, Some("Date/Time"), Some("PROBE_C"));
        assert_eq!(sheet.column_names(), vec!["Date/Time", "PROBE_C", "Days"]);

        let mut sheet = daily_sheet();
        derive_days(&mut sheet, Some("Date/Time"), Some("missing"));
        assert_eq!(sheet.column_names(), vec!["Date/Time", "Days", "PROBE_C"]);
    }

    #[test]
    fn test_text_column_is_coerced() {
        let mut sheet = Sheet::from_data(vec![
            vec!["when", "x"],
            vec!["01/03/2024 12:00", "a"],
            vec!["03/03/2024", "b"],
        ]);
        derive_days(&mut sheet, Some("when"), None);

        assert_eq!(sheet.get(0, 0).unwrap(), &at(1, 12));
        assert_eq!(
            sheet.column_by_name("Days").unwrap(),
            vec![CellValue::Float(0.5), CellValue::Float(2.0)]
        );
    }

    #[test]
    fn test_no_op_cases() {
        let original = daily_sheet();

        let mut sheet = original.clone();
        derive_days(&mut sheet, None, None);
        assert_eq!(sheet, original);

        derive_days(&mut sheet, Some("absent"), None);
        assert_eq!(sheet, original);

        let mut empty = Sheet::from_data(vec![vec!["Date/Time"], vec![""], vec!["junk"]]);
        let before = empty.clone();
        derive_days(&mut empty, Some("Date/Time"), None);
        assert_eq!(empty, before);
    }

    #[test]
    fn test_datetime_column_named_days_is_replaced() {
        let mut sheet = Sheet::from_data(vec![
            vec![CellValue::from("Days"), CellValue::from("PROBE_C")],
            vec![at(1, 0), CellValue::Float(1.0)],
        ]);
        let index = derive_days_at(&mut sheet, 0, None);

        assert_eq!(index, None);
        assert_eq!(sheet.column_names(), vec!["PROBE_C", "Days"]);
        assert_eq!(sheet.get(0, 1).unwrap(), &CellValue::Float(0.0));
    }

    #[test]
    fn test_positional_index_tracks_moves() {
        let mut sheet = Sheet::from_data(vec![
            vec![CellValue::from("Days"), CellValue::from("Date/Time")],
            vec![CellValue::Float(9.0), at(1, 0)],
        ]);
        assert_eq!(derive_days_at(&mut sheet, 1, None), Some(0));
        assert_eq!(sheet.column_names(), vec!["Date/Time", "Days"]);
    }

    #[test]
    fn test_stale_days_on_both_sides_of_datetime() {
        let mut sheet = Sheet::from_data(vec![
            vec![
                CellValue::from("Days"),
                CellValue::from("S/N"),
                CellValue::from("Days"),
                CellValue::from("Date/Time"),
                CellValue::from("Days"),
                CellValue::from("PROBE_C"),
            ],
            vec![
                CellValue::Float(9.0),
                CellValue::from("A"),
                CellValue::Float(9.0),
                at(2, 12),
                CellValue::Float(9.0),
                CellValue::Float(1.0),
            ],
        ]);
        assert_eq!(derive_days_at(&mut sheet, 3, None), Some(1));
        assert_eq!(sheet.column_names(), vec!["S/N", "Date/Time", "Days", "PROBE_C"]);
        assert_eq!(sheet.get(0, 2).unwrap(), &CellValue::Float(0.5));
    }
}
