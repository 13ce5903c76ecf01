//! End-to-end cleaning of one loaded sheet.

use crate::classify::{
    classify_columns, find_datetime_column_index, ColumnRole, SensorPattern,
    DEFAULT_SENSOR_PATTERN,
};
use crate::datetime::coerce_datetimes;
use crate::days::derive_days_at;
use crate::error::CleanResult;
use crate::headers::normalize_headers;
use crate::numeric::coerce_numeric_at;
use chrono::{Local, NaiveDateTime};
use sensorclean_sheet::{Book, CellValue, Sheet};
use serde::Serialize;
use std::cmp::Ordering;
use std::path::Path;

/// Metadata value reported when no datetime column was found.
pub const NOT_DETECTED: &str = "<not detected>";

/// Name of the cleaned data sheet in the output workbook.
pub const CLEANED_SHEET: &str = "Cleaned";

/// Name of the metadata sheet in the output workbook.
pub const README_SHEET: &str = "README";

const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Options for one cleaning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanConfig {
    /// Regex selecting sensor headers (case-insensitive search)
    pub sensor_pattern: String,
    /// Keep rows where every cell is empty
    pub keep_blank_rows: bool,
    /// Sheet to load; `None` means the first sheet
    pub sheet: Option<String>,
    /// Column to place `Days` after instead of the datetime column
    pub insert_days_after: Option<String>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            sensor_pattern: DEFAULT_SENSOR_PATTERN.to_string(),
            keep_blank_rows: false,
            sheet: None,
            insert_days_after: None,
        }
    }
}

impl CleanConfig {
    /// Set the sensor header pattern
    #[must_use]
    pub fn with_sensor_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.sensor_pattern = pattern.into();
        self
    }

    /// Set whether fully blank rows survive the run
    #[must_use]
    pub fn with_keep_blank_rows(mut self, keep: bool) -> Self {
        self.keep_blank_rows = keep;
        self
    }

    /// Set the sheet to load
    #[must_use]
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    /// Set the column `Days` is inserted after
    #[must_use]
    pub fn with_insert_days_after(mut self, column: impl Into<String>) -> Self {
        self.insert_days_after = Some(column.into());
        self
    }
}

/// Load the sheet a config points at: the named sheet, or the first one.
pub fn load_configured_sheet<P: AsRef<Path>>(path: P, config: &CleanConfig) -> CleanResult<Sheet> {
    let sheet = match &config.sheet {
        Some(name) => Sheet::from_xlsx_sheet(path, name)?,
        None => Sheet::from_xlsx(path)?,
    };
    Ok(sheet)
}

/// Facts about one cleaning run, written to the README sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanMetadata {
    generated_at: NaiveDateTime,
    sheet: String,
    datetime_column: Option<String>,
    sensor_pattern: String,
    sensor_columns: Vec<String>,
}

impl CleanMetadata {
    pub fn generated_at(&self) -> NaiveDateTime {
        self.generated_at
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// The detected datetime column, by normalized name
    pub fn datetime_column(&self) -> Option<&str> {
        self.datetime_column.as_deref()
    }

    /// The datetime column name, or [`NOT_DETECTED`]
    pub fn datetime_column_label(&self) -> &str {
        self.datetime_column().unwrap_or(NOT_DETECTED)
    }

    pub fn sensor_pattern(&self) -> &str {
        &self.sensor_pattern
    }

    /// Sensor columns in table order
    pub fn sensor_columns(&self) -> &[String] {
        &self.sensor_columns
    }

    pub fn sensor_count(&self) -> usize {
        self.sensor_columns.len()
    }

    /// README rows as key/value pairs, in output order
    pub fn key_values(&self) -> Vec<(&'static str, CellValue)> {
        vec![
            (
                "Generated",
                CellValue::from(self.generated_at.format(GENERATED_FORMAT).to_string()),
            ),
            ("Sheet", CellValue::from(self.sheet.as_str())),
            ("Datetime column", CellValue::from(self.datetime_column_label())),
            ("Sensor pattern", CellValue::from(self.sensor_pattern.as_str())),
            (
                "# Sensors",
                CellValue::Int(i64::try_from(self.sensor_count()).unwrap_or(i64::MAX)),
            ),
        ]
    }
}

/// Cleaned table plus the metadata of the run that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanOutput {
    pub table: Sheet,
    pub metadata: CleanMetadata,
}

impl CleanOutput {
    /// Build the output workbook: the `Cleaned` sheet, then a `README` sheet
    /// with `Key`/`Value` columns.
    pub fn to_book(&self) -> CleanResult<Book> {
        let mut readme = Sheet::from_data(vec![vec![
            CellValue::from("Key"),
            CellValue::from("Value"),
        ]]);
        for (key, value) in self.metadata.key_values() {
            readme.row_append(vec![CellValue::from(key), value])?;
        }

        let mut book = Book::new();
        book.add_sheet(CLEANED_SHEET, self.table.clone())?;
        book.add_sheet(README_SHEET, readme)?;
        Ok(book)
    }

    /// Write the output workbook to an xlsx file.
    pub fn save_xlsx<P: AsRef<Path>>(&self, path: P) -> CleanResult<()> {
        self.to_book()?.save_as_xlsx(path)?;
        Ok(())
    }
}

/// A configured cleaning pipeline.
///
/// Holds only the compiled pattern and the run options, so one pipeline can
/// serve any number of runs, from any thread.
#[derive(Debug, Clone)]
pub struct TablePipeline {
    pattern: SensorPattern,
    keep_blank_rows: bool,
    insert_days_after: Option<String>,
}

impl TablePipeline {
    /// Compile the configured pattern. Fails only on an invalid pattern.
    pub fn new(config: &CleanConfig) -> CleanResult<Self> {
        Ok(Self {
            pattern: SensorPattern::new(&config.sensor_pattern)?,
            keep_blank_rows: config.keep_blank_rows,
            insert_days_after: config.insert_days_after.clone(),
        })
    }

    pub fn pattern(&self) -> &SensorPattern {
        &self.pattern
    }

    /// Clean a sheet, stamping the metadata with the current local time.
    pub fn run(&self, raw: &Sheet) -> CleanOutput {
        self.run_at(raw, Local::now().naive_local())
    }

    /// Clean a sheet with an explicit generation timestamp.
    ///
    /// The input is left untouched; the cleaned table is a new sheet with the
    /// same name.
    pub fn run_at(&self, raw: &Sheet, generated_at: NaiveDateTime) -> CleanOutput {
        let mut table = raw.clone();

        let headers = normalize_headers(table.header());
        for (label, header) in table.header_mut().iter_mut().zip(&headers) {
            *label = if header.is_empty() {
                CellValue::Null
            } else {
                CellValue::from(header.as_str())
            };
        }

        let datetime_index = find_datetime_column_index(&table);
        let roles = classify_columns(&headers, datetime_index, &self.pattern);
        let sensor_indices: Vec<usize> = roles
            .iter()
            .enumerate()
            .filter(|(_, role)| **role == ColumnRole::Sensor)
            .map(|(index, _)| index)
            .collect();
        let sensor_columns: Vec<String> = sensor_indices
            .iter()
            .map(|&index| headers[index].clone())
            .collect();
        let datetime_column = datetime_index.map(|index| headers[index].clone());

        match datetime_index {
            Some(index) => coerce_datetime_column(&mut table, index),
            None => {
                tracing::warn!("No obvious datetime column detected. Proceeding without 'Days'.");
            }
        }

        if !self.keep_blank_rows {
            let removed = table.remove_empty_rows();
            tracing::debug!(removed, "dropped blank rows");
        }

        coerce_numeric_at(&mut table, &sensor_indices);

        let sort_index = datetime_index
            .and_then(|index| derive_days_at(&mut table, index, self.insert_days_after.as_deref()));

        if let Some(index) = sort_index {
            sort_by_timestamp(&mut table, index);
        }

        tracing::info!(
            sheet = table.name(),
            rows = table.row_count(),
            datetime = datetime_column.as_deref().unwrap_or(NOT_DETECTED),
            sensors = sensor_columns.len(),
            "cleaned sheet"
        );

        let metadata = CleanMetadata {
            generated_at,
            sheet: table.name().to_string(),
            datetime_column,
            sensor_pattern: self.pattern.as_str().to_string(),
            sensor_columns,
        };
        CleanOutput { table, metadata }
    }
}

fn coerce_datetime_column(table: &mut Sheet, index: usize) {
    let values: Vec<CellValue> = table.rows().map(|row| row[index].clone()).collect();
    let coerced = coerce_datetimes(&values);
    let parsed = coerced.iter().flatten().count();
    for (row, slot) in table.rows_mut().zip(coerced) {
        row[index] = slot.map_or(CellValue::Null, CellValue::DateTime);
    }
    tracing::debug!(parsed, total = values.len(), "coerced datetime column");
}

/// Stable ascending sort on the timestamp column; rows without a timestamp go
/// last in their original order. Skipped when the column has no timestamps.
fn sort_by_timestamp(table: &mut Sheet, index: usize) {
    if !table.rows().any(|row| matches!(row[index], CellValue::DateTime(_))) {
        return;
    }
    table.sort_rows_by(|a, b| match (a[index].as_datetime(), b[index].as_datetime()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
