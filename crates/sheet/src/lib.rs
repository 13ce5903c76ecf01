//! Sheet/Book module for sensorclean
//!
//! Holds the in-memory table model that the cleaning pipeline works on, plus the
//! thin spreadsheet I/O around it: listing and loading worksheets from `.xlsx`
//! files and writing a multi-sheet workbook back out.
//!
//! # Examples
//!
//! ## Creating a sheet from data
//!
//! ```
//! use sensorclean_sheet::{Sheet, CellValue};
//!
//! let sheet = Sheet::from_data(vec![
//!     vec!["S/N", "Date/Time", "PROBE_C"],
//!     vec!["A1", "01/02/2024 10:00", "21.5"],
//!     vec!["A1", "01/02/2024 11:00", "N/A"],
//! ]);
//!
//! assert_eq!(sheet.row_count(), 2);
//! assert_eq!(sheet.col_count(), 3);
//! assert_eq!(sheet.get_by_name(0, "PROBE_C").unwrap(), &CellValue::from("21.5"));
//! ```
//!
//! ## Working with books
//!
//! ```
//! use sensorclean_sheet::{Book, Sheet};
//!
//! let mut book = Book::new();
//! book.add_sheet("Cleaned", Sheet::new()).unwrap();
//! book.add_sheet("README", Sheet::new()).unwrap();
//!
//! assert_eq!(book.sheet_names(), vec!["Cleaned", "README"]);
//! ```

mod book;
mod cell;
mod error;
mod sheet;
mod xlsx;

/// Re-export book type.
pub use book::Book;
/// Re-export cell value type and spreadsheet serial date helpers.
pub use cell::{datetime_to_serial, serial_to_datetime, CellValue, UNIX_EPOCH_SERIAL};
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export sheet type.
pub use sheet::Sheet;
