//! Error types for sensorclean.

use sensorclean_sheet::SheetError;
use thiserror::Error;

/// Result type for sensorclean operations.
pub type CleanResult<T> = Result<T, CleanError>;

/// Errors surfaced at the pipeline boundary.
///
/// Per-cell and per-column detection failures never show up here; they are
/// absorbed into missing values and the run metadata.
#[derive(Debug, Error)]
pub enum CleanError {
    /// The sensor header pattern does not compile as a regular expression.
    #[error("Configuration error: invalid sensor pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The workbook or sheet could not be loaded as a table.
    #[error(transparent)]
    Sheet(#[from] SheetError),
}
