//! Sparse-ish cell grid backing the local store adapters.
//!
//! Reads mimic the Sheets values API: trailing empty cells and trailing
//! empty rows are dropped from every returned block.

use super::range::A1Range;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    fn cell(&self, row: usize, col: usize) -> &str {
        let (Some(r), Some(c)) = (row.checked_sub(1), col.checked_sub(1)) else {
            return "";
        };
        self.rows
            .get(r)
            .and_then(|cells| cells.get(c))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Values inside `range`, rows trimmed the way the Sheets API returns them
    pub fn read(&self, range: &A1Range) -> Vec<Vec<String>> {
        let first_row = range.first_row();
        let last_row = range.last_row().unwrap_or(self.rows.len());

        let mut block: Vec<Vec<String>> = (first_row..=last_row)
            .map(|r| {
                let mut row: Vec<String> = (range.first_col()..=range.last_col())
                    .map(|c| self.cell(r, c).to_string())
                    .collect();
                while row.last().is_some_and(|v| v.is_empty()) {
                    row.pop();
                }
                row
            })
            .collect();

        while block.last().is_some_and(|r| r.is_empty()) {
            block.pop();
        }
        block
    }

    /// Write `values` with their top-left corner at the start of `range`
    pub fn write(&mut self, range: &A1Range, values: &[Vec<String>]) {
        for (dr, row) in values.iter().enumerate() {
            for (dc, value) in row.iter().enumerate() {
                self.set(range.first_row() + dr, range.first_col() + dc, value);
            }
        }
    }

    /// Set a 1-based cell; position 0 is outside the grid and ignored
    fn set(&mut self, row: usize, col: usize, value: &str) {
        if row == 0 || col == 0 {
            return;
        }
        if self.rows.len() < row {
            self.rows.resize_with(row, Vec::new);
        }
        let cells = &mut self.rows[row - 1];
        if cells.len() < col {
            cells.resize(col, String::new());
        }
        cells[col - 1] = value.to_string();
    }

    /// Column values from row 1 down to the last non-empty cell
    pub fn column_values(&self, col: usize) -> Vec<String> {
        let mut values: Vec<String> = (1..=self.rows.len())
            .map(|r| self.cell(r, col).to_string())
            .collect();
        while values.last().is_some_and(|v| v.is_empty()) {
            values.pop();
        }
        values
    }
}
