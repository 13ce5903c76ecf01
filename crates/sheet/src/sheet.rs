use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use std::cmp::Ordering;

/// A sheet holding a header row of raw labels plus row-major data.
///
/// Every data row has exactly as many cells as there are header labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    header: Vec<CellValue>,
    data: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Create a new empty sheet
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Sheet1")
    }

    /// Create a new empty sheet with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            header: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Create a sheet from a 2D vector of values; the first row is the header.
    ///
    /// Rows shorter than the widest row are padded with nulls.
    #[must_use]
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Self {
        let mut rows = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect::<Vec<CellValue>>());

        let header = rows.next().unwrap_or_default();
        let mut sheet = Sheet {
            name: "Sheet1".to_string(),
            header,
            data: rows.collect(),
        };
        sheet.pad_rows();
        sheet
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of data rows (the header is not counted)
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.header.len()
    }

    // ===== Header =====

    /// Get the raw header labels
    #[must_use]
    pub fn header(&self) -> &[CellValue] {
        &self.header
    }

    /// Mutable access to the header labels (the column count cannot change)
    pub fn header_mut(&mut self) -> &mut [CellValue] {
        &mut self.header
    }

    /// Header labels rendered as text, in column order
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.header.iter().map(CellValue::as_str).collect()
    }

    /// Check whether any column carries the given name
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.header.iter().any(|label| label.as_str() == name)
    }

    /// Position of the first column with the given name
    pub fn column_index_by_name(&self, name: &str) -> Result<usize> {
        self.header
            .iter()
            .position(|label| label.as_str() == name)
            .ok_or_else(|| SheetError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    // ===== Cell Access =====

    /// Get a cell value by data row and column index (0-based)
    pub fn get(&self, row: usize, col: usize) -> Result<&CellValue> {
        let cells = self.row(row)?;
        cells.get(col).ok_or(SheetError::ColumnIndexOutOfBounds {
            index: col,
            count: self.col_count(),
        })
    }

    /// Get a cell value by data row index and column name
    pub fn get_by_name(&self, row: usize, col_name: &str) -> Result<&CellValue> {
        let col = self.column_index_by_name(col_name)?;
        self.get(row, col)
    }

    // ===== Row Operations =====

    /// Get a data row by index
    pub fn row(&self, index: usize) -> Result<&[CellValue]> {
        self.data
            .get(index)
            .map(Vec::as_slice)
            .ok_or(SheetError::RowIndexOutOfBounds {
                index,
                count: self.row_count(),
            })
    }

    /// Append a data row
    pub fn row_append<T: Into<CellValue>>(&mut self, data: Vec<T>) -> Result<()> {
        if data.len() != self.col_count() {
            return Err(SheetError::LengthMismatch {
                expected: self.col_count(),
                actual: data.len(),
            });
        }
        self.data.push(data.into_iter().map(Into::into).collect());
        Ok(())
    }

    /// Remove empty rows (rows where all cells are null or blank text).
    /// Returns the number of rows removed.
    pub fn remove_empty_rows(&mut self) -> usize {
        let original_len = self.data.len();
        self.data.retain(|row| !row.iter().all(CellValue::is_blank));
        original_len - self.data.len()
    }

    /// Stable sort of the data rows with a comparator
    pub fn sort_rows_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&[CellValue], &[CellValue]) -> Ordering,
    {
        self.data.sort_by(|a, b| compare(a, b));
    }

    // ===== Column Operations =====

    /// Get an entire column by index (0-based)
    pub fn column(&self, index: usize) -> Result<Vec<CellValue>> {
        if index >= self.col_count() {
            return Err(SheetError::ColumnIndexOutOfBounds {
                index,
                count: self.col_count(),
            });
        }

        Ok(self.data.iter().map(|row| row[index].clone()).collect())
    }

    /// Get an entire column by name
    pub fn column_by_name(&self, name: &str) -> Result<Vec<CellValue>> {
        let index = self.column_index_by_name(name)?;
        self.column(index)
    }

    /// Insert a named column at a specific index
    pub fn column_insert<L, T>(&mut self, index: usize, label: L, data: Vec<T>) -> Result<()>
    where
        L: Into<CellValue>,
        T: Into<CellValue>,
    {
        if index > self.col_count() {
            return Err(SheetError::ColumnIndexOutOfBounds {
                index,
                count: self.col_count(),
            });
        }

        if data.len() != self.row_count() {
            return Err(SheetError::LengthMismatch {
                expected: self.row_count(),
                actual: data.len(),
            });
        }

        self.header.insert(index, label.into());
        for (row, value) in self.data.iter_mut().zip(data) {
            row.insert(index, value.into());
        }
        Ok(())
    }

    /// Delete every column carrying the given name.
    /// Returns the positions the removed columns held, in ascending order.
    pub fn column_delete_all_by_name(&mut self, name: &str) -> Vec<usize> {
        let removed: Vec<usize> = self
            .header
            .iter()
            .enumerate()
            .filter(|(_, label)| label.as_str() == name)
            .map(|(index, _)| index)
            .collect();

        // Back to front so earlier positions stay valid.
        for &index in removed.iter().rev() {
            self.header.remove(index);
            for row in &mut self.data {
                row.remove(index);
            }
        }
        removed
    }

    // ===== Conversion =====

    /// Iterate over data rows
    pub fn rows(&self) -> impl Iterator<Item = &Vec<CellValue>> {
        self.data.iter()
    }

    /// Iterate mutably over data rows (row width cannot change)
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [CellValue]> {
        self.data.iter_mut().map(Vec::as_mut_slice)
    }

    /// Replace header and data at once, padding rows to the header width.
    ///
    /// Used by loaders that produce a header row and body separately.
    pub fn replace_contents(&mut self, header: Vec<CellValue>, data: Vec<Vec<CellValue>>) {
        self.header = header;
        self.data = data;
        self.pad_rows();
    }

    /// Widen the header and every row to the same number of cells
    fn pad_rows(&mut self) {
        let width = self
            .data
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0);
        self.header.resize(width, CellValue::Null);
        for row in &mut self.data {
            row.resize(width, CellValue::Null);
        }
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_data_pads_short_rows() {
        let sheet = Sheet::from_data(vec![vec!["a", "b"], vec!["1"], vec!["1", "2", "3"]]);
        assert_eq!(sheet.col_count(), 3);
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.header()[2], CellValue::Null);
        assert_eq!(sheet.get(0, 1).unwrap(), &CellValue::Null);
    }

    #[test]
    fn test_remove_empty_rows() {
        let mut sheet = Sheet::from_data(vec![
            vec![CellValue::from("a"), CellValue::from("b")],
            vec![CellValue::Null, CellValue::from("  ")],
            vec![CellValue::Int(1), CellValue::Null],
        ]);
        assert_eq!(sheet.remove_empty_rows(), 1);
        assert_eq!(sheet.row_count(), 1);
        assert_eq!(sheet.get(0, 0).unwrap(), &CellValue::Int(1));
    }

    #[test]
    fn test_sort_rows_is_stable() {
        let mut sheet = Sheet::from_data(vec![
            vec!["k", "tag"],
            vec!["2", "a"],
            vec!["1", "b"],
            vec!["2", "c"],
            vec!["1", "d"],
        ]);
        sheet.sort_rows_by(|a, b| a[0].as_str().cmp(&b[0].as_str()));
        let tags: Vec<String> = sheet.column(1).unwrap().iter().map(CellValue::as_str).collect();
        assert_eq!(tags, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_column_delete_all_by_name() {
        let mut sheet = Sheet::from_data(vec![
            vec!["Days", "x", "Days", "y"],
            vec!["1", "2", "3", "4"],
        ]);
        assert_eq!(sheet.column_delete_all_by_name("Days"), vec![0, 2]);
        assert_eq!(sheet.column_names(), vec!["x", "y"]);
        assert_eq!(
            sheet.row(0).unwrap(),
            &[CellValue::from("2"), CellValue::from("4")]
        );
        assert!(sheet.column_delete_all_by_name("Days").is_empty());
    }
}
