//! A1-notation helpers (`K2:K`, `A2:E`, `C5`).

use crate::error::{CrawlError, OptionExt, Result};

/// One corner of a range. `row` is `None` for open-ended column ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    /// 1-based column index
    pub col: usize,
    /// 1-based row index
    pub row: Option<usize>,
}

/// A parsed A1 range; a single cell has no `end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct A1Range {
    pub start: CellRef,
    pub end: Option<CellRef>,
}

impl A1Range {
    pub fn first_row(&self) -> usize {
        self.start.row.unwrap_or(1)
    }

    pub fn first_col(&self) -> usize {
        self.start.col
    }

    /// Last column covered, inclusive
    pub fn last_col(&self) -> usize {
        self.end.map(|e| e.col).unwrap_or(self.start.col)
    }

    /// Last row covered, inclusive; `None` means "to the end of the sheet"
    pub fn last_row(&self) -> Option<usize> {
        match self.end {
            Some(end) => end.row,
            None => self.start.row,
        }
    }
}

/// Column letters to a 1-based index (`A` = 1, `AA` = 27)
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0usize, |acc, c| {
        c.is_ascii_alphabetic()
            .then(|| acc * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1))
    })
}

/// 1-based column index to letters
pub fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// A1 reference for a single cell
pub fn cell_name(row: usize, col: usize) -> String {
    format!("{}{}", column_letter(col), row)
}

fn parse_cell(raw: &str) -> Result<CellRef> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (letters, digits) = raw.split_at(split);

    let col = column_index(letters).ok_or_parse(&format!("Invalid column in '{}'", raw))?;
    let row = if digits.is_empty() {
        None
    } else {
        let row: usize = digits
            .parse()
            .map_err(|_| CrawlError::Parse(format!("Invalid row in '{}'", raw)))?;
        if row == 0 {
            return Err(CrawlError::Parse(format!("Row 0 in '{}'", raw)));
        }
        Some(row)
    };

    Ok(CellRef { col, row })
}

/// Single-cell range at a 1-based position; row or column 0 is rejected.
pub fn cell_range(row: usize, col: usize) -> Result<A1Range> {
    if row == 0 || col == 0 {
        return Err(CrawlError::Parse(format!(
            "Cell position ({}, {}) is not 1-based",
            row, col
        )));
    }
    Ok(A1Range {
        start: CellRef { col, row: Some(row) },
        end: None,
    })
}

/// Parse `A2:E`, `K2:K`, `C5` and the like.
pub fn parse_range(raw: &str) -> Result<A1Range> {
    match raw.split_once(':') {
        Some((start, end)) => Ok(A1Range {
            start: parse_cell(start)?,
            end: Some(parse_cell(end)?),
        }),
        None => Ok(A1Range {
            start: parse_cell(raw)?,
            end: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_round_trip() {
        let cases = [
            ("A", 1),
            ("K", 11),
            ("N", 14),
            ("Z", 26),
            ("AA", 27),
            ("AZ", 52),
        ];
        for (letters, index) in cases {
            assert_eq!(column_index(letters), Some(index));
            assert_eq!(column_letter(index), letters);
        }
        assert_eq!(column_index("a"), Some(1));
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("A1"), None);
    }

    #[test]
    fn test_parse_open_range() {
        let range = parse_range("A2:E").expect("range");
        assert_eq!(range.first_row(), 2);
        assert_eq!(range.first_col(), 1);
        assert_eq!(range.last_col(), 5);
        assert_eq!(range.last_row(), None);
    }

    #[test]
    fn test_parse_single_cell() {
        let range = parse_range("C12").expect("range");
        assert_eq!(range.first_row(), 12);
        assert_eq!(range.last_row(), Some(12));
        assert_eq!(range.last_col(), 3);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_range("12").is_err());
        assert!(parse_range("A0").is_err());
        assert!(parse_range("A1:").is_err());
    }

    #[test]
    fn test_cell_range_rejects_zero() {
        assert!(matches!(cell_range(0, 1), Err(CrawlError::Parse(_))));
        assert!(matches!(cell_range(1, 0), Err(CrawlError::Parse(_))));
        assert_eq!(cell_range(5, 14).map(|r| r.last_row()).ok(), Some(Some(5)));
    }

    #[test]
    fn test_cell_name() {
        assert_eq!(cell_name(7, 14), "N7");
    }
}
