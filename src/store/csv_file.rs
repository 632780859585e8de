//! Local CSV backend: `<dir>/<sheet>.csv`, no header handling, row 1 is row 1.

use super::grid::Grid;
use super::range::{cell_range, column_index, parse_range};
use super::TabularStore;
use crate::error::{CrawlError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// Directory of CSV files, one per sheet
#[derive(Debug)]
pub struct CsvStore {
    dir: PathBuf,
    // Serializes read-modify-write cycles on the files.
    lock: Mutex<()>,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    pub fn sheet_path(&self, sheet: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", sheet))
    }

    fn load(&self, sheet: &str) -> Result<Grid> {
        let path = self.sheet_path(sheet);
        if !path.exists() {
            debug!(path = %path.display(), "Sheet file not found, treating as empty");
            return Ok(Grid::default());
        }
        load_grid(&path)
    }

    fn save(&self, sheet: &str, grid: &Grid) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(self.sheet_path(sheet))?;

        for row in grid.rows() {
            if row.is_empty() {
                // csv refuses zero-field records
                wtr.write_record([""])?;
            } else {
                wtr.write_record(row)?;
            }
        }
        wtr.flush()?;
        Ok(())
    }

    async fn modify(&self, sheet: &str, f: impl FnOnce(&mut Grid)) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut grid = self.load(sheet)?;
        f(&mut grid);
        self.save(sheet, &grid)
    }
}

fn load_grid(path: &Path) -> Result<Grid> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(Grid::from_rows(rows))
}

#[async_trait]
impl TabularStore for CsvStore {
    async fn read(&self, sheet: &str, range: &str) -> Result<Vec<Vec<String>>> {
        let range = parse_range(range)?;
        let _guard = self.lock.lock().await;
        Ok(self.load(sheet)?.read(&range))
    }

    async fn write(&self, sheet: &str, range: &str, rows: &[Vec<String>]) -> Result<()> {
        let range = parse_range(range)?;
        self.modify(sheet, |grid| grid.write(&range, rows)).await
    }

    async fn column_values(&self, sheet: &str, column: &str) -> Result<Vec<String>> {
        let col = column_index(column)
            .ok_or_else(|| CrawlError::Parse(format!("Invalid column '{}'", column)))?;
        let _guard = self.lock.lock().await;
        Ok(self.load(sheet)?.column_values(col))
    }

    async fn update_cell(&self, sheet: &str, row: usize, col: usize, value: &str) -> Result<()> {
        let range = cell_range(row, col)?;
        self.modify(sheet, |grid| grid.write(&range, &[vec![value.to_string()]]))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_csv_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = CsvStore::new(dir.path())?;

        store
            .write(
                "literature_data",
                "A1",
                &[vec!["title".to_string(), "abstract, with comma".to_string()]],
            )
            .await?;
        store
            .write("literature_data", "A3", &[vec!["second\nline".to_string()]])
            .await?;

        let reopened = CsvStore::new(dir.path())?;
        assert_eq!(
            reopened.read("literature_data", "A1:B").await?,
            vec![
                vec!["title".to_string(), "abstract, with comma".to_string()],
                vec![],
                vec!["second\nline".to_string()],
            ]
        );
        assert_eq!(reopened.column_values("literature_data", "A").await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_cell_creates_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = CsvStore::new(dir.path())?;
        store.update_cell("queries", 2, 4, "DONE").await?;

        assert!(store.sheet_path("queries").exists());
        assert_eq!(
            store.read("queries", "D2").await?,
            vec![vec!["DONE".to_string()]]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_update_cell_rejects_zero_position() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = CsvStore::new(dir.path())?;
        let result = store.update_cell("queries", 0, 4, "DONE").await;

        assert!(matches!(result, Err(CrawlError::Parse(_))));
        assert!(!store.sheet_path("queries").exists());
        Ok(())
    }
}
