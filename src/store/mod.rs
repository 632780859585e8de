//! Tabular store: the spreadsheet that is both the query queue and the output.
//!
//! [`TabularStore`] is the narrow interface every backend implements;
//! [`Workbook`] layers the query-sheet and literature-sheet operations on top.
//!
//! ## Backends
//!
//! - [`SheetsStore`] - Google Sheets values API
//! - [`CsvStore`] - one CSV file per sheet in a local directory
//! - [`MemoryStore`] - in-process grid, used for tests and dry runs

pub mod csv_file;
pub mod grid;
pub mod memory;
pub mod range;
pub mod sheets;
pub mod workbook;

use crate::error::Result;
use async_trait::async_trait;

pub use csv_file::CsvStore;
pub use memory::MemoryStore;
pub use sheets::SheetsStore;
pub use workbook::Workbook;

/// Generic rows-and-cells store addressed by sheet name and A1 range
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Values in `range`, trailing empty cells and rows omitted
    async fn read(&self, sheet: &str, range: &str) -> Result<Vec<Vec<String>>>;

    /// Write `rows` with their top-left corner at the start of `range`
    async fn write(&self, sheet: &str, range: &str, rows: &[Vec<String>]) -> Result<()>;

    /// Column values (by letter) from row 1 to the last populated cell
    async fn column_values(&self, sheet: &str, column: &str) -> Result<Vec<String>>;

    /// Set a single 1-based cell
    async fn update_cell(&self, sheet: &str, row: usize, col: usize, value: &str) -> Result<()>;
}
