//! In-process store.

use super::grid::Grid;
use super::range::{cell_range, column_index, parse_range};
use super::TabularStore;
use crate::error::{CrawlError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Named grids held in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    sheets: Mutex<HashMap<String, Grid>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a sheet with raw rows (row 1 first)
    pub fn with_sheet(self, name: &str, rows: Vec<Vec<String>>) -> Self {
        if let Ok(mut sheets) = self.sheets.lock() {
            sheets.insert(name.to_string(), Grid::from_rows(rows));
        }
        self
    }

    /// Copy of a sheet's rows, empty if it does not exist
    pub fn snapshot(&self, name: &str) -> Vec<Vec<String>> {
        self.sheets
            .lock()
            .ok()
            .and_then(|sheets| sheets.get(name).map(|g| g.rows().to_vec()))
            .unwrap_or_default()
    }

    fn with_grid<T>(&self, sheet: &str, f: impl FnOnce(&mut Grid) -> T) -> Result<T> {
        let mut sheets = self
            .sheets
            .lock()
            .map_err(|_| CrawlError::Store("memory store lock poisoned".to_string()))?;
        Ok(f(sheets.entry(sheet.to_string()).or_default()))
    }
}

#[async_trait]
impl TabularStore for MemoryStore {
    async fn read(&self, sheet: &str, range: &str) -> Result<Vec<Vec<String>>> {
        let range = parse_range(range)?;
        self.with_grid(sheet, |grid| grid.read(&range))
    }

    async fn write(&self, sheet: &str, range: &str, rows: &[Vec<String>]) -> Result<()> {
        let range = parse_range(range)?;
        self.with_grid(sheet, |grid| grid.write(&range, rows))
    }

    async fn column_values(&self, sheet: &str, column: &str) -> Result<Vec<String>> {
        let col = column_index(column)
            .ok_or_else(|| CrawlError::Parse(format!("Invalid column '{}'", column)))?;
        self.with_grid(sheet, |grid| grid.column_values(col))
    }

    async fn update_cell(&self, sheet: &str, row: usize, col: usize, value: &str) -> Result<()> {
        let range = cell_range(row, col)?;
        self.with_grid(sheet, |grid| grid.write(&range, &[vec![value.to_string()]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_read() -> Result<()> {
        let store = MemoryStore::new();
        store
            .write("s", "A2", &[vec!["x".to_string(), "y".to_string()]])
            .await?;
        store.update_cell("s", 3, 2, "z").await?;

        assert_eq!(store.read("s", "A2:B").await?, vec![vec!["x", "y"], vec!["", "z"]]);
        assert_eq!(store.column_values("s", "A").await?, vec!["", "x"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_cell_rejects_zero_position() -> Result<()> {
        let store = MemoryStore::new();
        assert!(matches!(
            store.update_cell("x", 0, 1, "v").await,
            Err(CrawlError::Parse(_))
        ));
        assert!(matches!(
            store.update_cell("x", 1, 0, "v").await,
            Err(CrawlError::Parse(_))
        ));
        assert!(store.snapshot("x").is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_sheet_reads_empty() -> Result<()> {
        let store = MemoryStore::new();
        assert!(store.read("nope", "A2:E").await?.is_empty());
        Ok(())
    }
}
