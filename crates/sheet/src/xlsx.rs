use crate::book::Book;
use crate::cell::{datetime_to_serial, serial_to_datetime, CellValue};
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use calamine::{open_workbook, Data, Reader, Xlsx, XlsxError};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Number format applied to timestamp cells on write
const DATETIME_NUM_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

fn read_error(e: XlsxError) -> SheetError {
    SheetError::Read(e.to_string())
}

fn write_error(e: rust_xlsxwriter::XlsxError) -> SheetError {
    SheetError::Write(e.to_string())
}

fn open_xlsx(path: &Path) -> Result<Xlsx<BufReader<File>>> {
    open_workbook(path).map_err(|e: XlsxError| SheetError::Read(format!("{}: {e}", path.display())))
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::DateTime(dt) => {
            // Date-formatted cells hold serials counted from 1899-12-30
            let serial = dt.as_f64();
            serial_to_datetime(serial).map_or(CellValue::Float(serial), CellValue::DateTime)
        }
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(e.to_string()),
    }
}

impl Sheet {
    /// Load the first sheet of an Excel file; its first row becomes the header
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be opened or read.
    pub fn from_xlsx<P: AsRef<Path>>(path: P) -> Result<Self> {
        let sheet_names = Book::xlsx_sheet_names(path.as_ref())?;
        match sheet_names.first() {
            Some(first) => Self::from_xlsx_sheet(path, first),
            None => Ok(Sheet::new()),
        }
    }

    /// Load a specific sheet from an Excel file by name; its first row becomes the header
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be opened, sheet not found, or read fails.
    pub fn from_xlsx_sheet<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<Self> {
        let mut workbook = open_xlsx(path.as_ref())?;

        if !workbook.sheet_names().iter().any(|name| name == sheet_name) {
            return Err(SheetError::SheetNotFound {
                name: sheet_name.to_string(),
            });
        }

        let range = workbook.worksheet_range(sheet_name).map_err(read_error)?;

        let mut rows = range
            .rows()
            .map(|row| row.iter().map(data_to_cell_value).collect::<Vec<CellValue>>());
        let header = rows.next().unwrap_or_default();
        let data: Vec<Vec<CellValue>> = rows.collect();

        let mut sheet = Sheet::with_name(sheet_name);
        sheet.replace_contents(header, data);
        Ok(sheet)
    }

    /// Write header and data rows to a worksheet
    fn write_to_worksheet(
        &self,
        worksheet: &mut Worksheet,
        datetime_format: &Format,
    ) -> Result<()> {
        let rows = std::iter::once(self.header()).chain(self.rows().map(Vec::as_slice));

        for (row_idx, row) in rows.enumerate() {
            let row_num = u32::try_from(row_idx)
                .map_err(|_| SheetError::Write("Row index overflow".to_string()))?;
            for (col_idx, cell) in row.iter().enumerate() {
                let col_num = u16::try_from(col_idx)
                    .map_err(|_| SheetError::Write("Column index overflow".to_string()))?;

                match cell {
                    CellValue::Null => {} // Leave empty
                    CellValue::Bool(b) => {
                        worksheet
                            .write_boolean(row_num, col_num, *b)
                            .map_err(write_error)?;
                    }
                    CellValue::Int(i) => {
                        // Note: Excel stores all numbers as f64, so integers > 2^53
                        // (9,007,199,254,740,992) may lose precision
                        worksheet
                            .write_number(row_num, col_num, *i as f64)
                            .map_err(write_error)?;
                    }
                    CellValue::Float(f) if f.is_finite() => {
                        worksheet
                            .write_number(row_num, col_num, *f)
                            .map_err(write_error)?;
                    }
                    CellValue::Float(_) => {}
                    CellValue::DateTime(dt) => {
                        worksheet
                            .write_number_with_format(
                                row_num,
                                col_num,
                                datetime_to_serial(*dt),
                                datetime_format,
                            )
                            .map_err(write_error)?;
                    }
                    CellValue::String(s) => {
                        worksheet
                            .write_string(row_num, col_num, s)
                            .map_err(write_error)?;
                    }
                }
            }
        }

        Ok(())
    }
}

impl Book {
    /// Save the book to an Excel file, one worksheet per sheet in order
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or written.
    pub fn save_as_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut workbook = Workbook::new();
        let datetime_format = Format::new().set_num_format(DATETIME_NUM_FORMAT);

        for (name, sheet) in self.sheets() {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name).map_err(write_error)?;
            sheet.write_to_worksheet(worksheet, &datetime_format)?;
        }

        workbook.save(path.as_ref()).map_err(write_error)?;

        Ok(())
    }

    /// Get sheet names from an Excel file without loading data
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be opened.
    pub fn xlsx_sheet_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
        let workbook = open_xlsx(path.as_ref())?;

        Ok(workbook.sheet_names().iter().map(|s| s.to_string()).collect())
    }
}
