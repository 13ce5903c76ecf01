//! # sensorclean-core
//!
//! Column detection and normalization for sheets exported by sensor loggers.
//!
//! Logger exports vary by vendor: the timestamp column goes by several names
//! or hides behind serial dates, and sensors are only recognizable by naming
//! convention. This crate finds those columns, coerces them to typed values,
//! adds a `Days` elapsed-time column and sorts rows by time.
//!
//! This crate provides:
//! - Header normalization
//! - Sensor and datetime column detection
//! - Datetime and numeric coercion
//! - The `Days` column
//! - [`TablePipeline`], which runs all of the above over one sheet
//!
//! ```
//! use sensorclean_core::{CleanConfig, TablePipeline};
//! use sensorclean_sheet::Sheet;
//!
//! let raw = Sheet::from_data(vec![
//!     vec!["S/N", "Date/Time", "PROBE_C"],
//!     vec!["A1", "02/01/2024 10:00", "21.5"],
//!     vec!["A1", "02/01/2024 11:00", "N/A"],
//! ]);
//!
//! let pipeline = TablePipeline::new(&CleanConfig::default()).unwrap();
//! let out = pipeline.run(&raw);
//!
//! assert_eq!(out.table.column_names(), vec!["S/N", "Date/Time", "Days", "PROBE_C"]);
//! assert_eq!(out.metadata.sensor_columns(), ["PROBE_C".to_string()]);
//! ```

/// Column roles, sensor pattern and datetime column detection.
pub mod classify;
/// Timestamp coercion.
pub mod datetime;
/// The derived `Days` column.
pub mod days;
/// Error types and result aliases.
pub mod error;
/// Header label normalization.
pub mod headers;
/// Numeric coercion of sensor columns.
pub mod numeric;
/// The cleaning pipeline and its configuration.
pub mod pipeline;

pub use classify::{
    classify_columns, detect_sensor_columns, find_datetime_column, find_datetime_column_index,
    is_meta_column, ColumnRole, SensorPattern, DATETIME_CANDIDATES, DATETIME_DETECTION_THRESHOLD,
    DEFAULT_SENSOR_PATTERN, META_COLUMNS,
};
pub use datetime::{coerce_datetimes, parse_datetime_text, SERIAL_FALLBACK_THRESHOLD};
pub use days::{derive_days, DAYS_COLUMN};
pub use error::{CleanError, CleanResult};
pub use headers::{normalize_header, normalize_headers};
pub use numeric::coerce_numeric;
pub use pipeline::{
    load_configured_sheet, CleanConfig, CleanMetadata, CleanOutput, TablePipeline, CLEANED_SHEET,
    NOT_DETECTED, README_SHEET,
};
