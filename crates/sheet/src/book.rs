use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use indexmap::IndexMap;

/// A book containing multiple sheets (preserves insertion order)
#[derive(Debug, Clone, Default)]
pub struct Book {
    sheets: IndexMap<String, Sheet>,
}

impl Book {
    /// Create a new empty book
    #[must_use]
    pub fn new() -> Self {
        Book {
            sheets: IndexMap::new(),
        }
    }

    /// Get all sheet names in order
    #[must_use]
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    /// Add a sheet to the book under the given name
    pub fn add_sheet(&mut self, name: &str, sheet: Sheet) -> Result<()> {
        if self.sheets.contains_key(name) {
            return Err(SheetError::SheetAlreadyExists {
                name: name.to_string(),
            });
        }

        let mut sheet = sheet;
        sheet.set_name(name);
        self.sheets.insert(name.to_string(), sheet);
        Ok(())
    }

    /// Iterate over (name, sheet) pairs in order
    pub fn sheets(&self) -> impl Iterator<Item = (&String, &Sheet)> {
        self.sheets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_book() {
        let book = Book::new();
        assert!(book.sheet_names().is_empty());
        assert_eq!(book.sheets().count(), 0);
    }

    #[test]
    fn test_add_sheet_renames_and_keeps_order() {
        let mut book = Book::new();
        book.add_sheet("Cleaned", Sheet::with_name("raw")).unwrap();
        book.add_sheet("README", Sheet::new()).unwrap();

        assert_eq!(book.sheet_names(), vec!["Cleaned", "README"]);
        let names: Vec<&str> = book.sheets().map(|(_, sheet)| sheet.name()).collect();
        assert_eq!(names, vec!["Cleaned", "README"]);
    }

    #[test]
    fn test_sheet_already_exists() {
        let mut book = Book::new();
        book.add_sheet("Sheet1", Sheet::new()).unwrap();
        let result = book.add_sheet("Sheet1", Sheet::new());
        assert!(matches!(result, Err(SheetError::SheetAlreadyExists { .. })));
    }
}
