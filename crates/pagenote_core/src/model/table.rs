//! Table block payload.
//!
//! # Responsibility
//! - Own the cell matrix of a table block.
//! - Enforce the rectangular shape and the 1x1 floor on every mutation.
//!
//! # Invariants
//! - `rows >= 1` and `columns >= 1`.
//! - `cells.len() == rows` and every row has exactly `columns` cells.
//! - Cell edits never resize the matrix.
//! - Declared sizes above `MAX_DECLARED_DIMENSION` are only honored as far
//!   as the supplied cells reach.

use crate::config::{DEFAULT_TABLE_COLUMNS, DEFAULT_TABLE_ROWS};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Table mutation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Addressed cell, row or column does not exist.
    OutOfRange { row: Option<usize>, col: Option<usize> },
    /// Removal would shrink the table below one row or one column.
    Floor,
}

impl Display for TableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { row, col } => {
                write!(f, "table position out of range: row={row:?} col={col:?}")
            }
            Self::Floor => write!(f, "table must keep at least one row and one column"),
        }
    }
}

impl Error for TableError {}

/// Largest row or column count `from_cells` pads up to.
pub const MAX_DECLARED_DIMENSION: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    rows: usize,
    columns: usize,
    cells: Vec<Vec<String>>,
}

impl TableData {
    /// Creates an empty table; sizes below 1 are raised to 1.
    pub fn new(rows: usize, columns: usize) -> Self {
        let rows = rows.max(1);
        let columns = columns.max(1);
        Self {
            rows,
            columns,
            cells: vec![vec![String::new(); columns]; rows],
        }
    }

    /// Builds a table from possibly ragged input, padding or truncating rows
    /// and cells so the result is exactly `rows x columns`.
    ///
    /// Padding stops at `MAX_DECLARED_DIMENSION` or the extent of `cells`,
    /// whichever is larger.
    pub fn from_cells(rows: usize, columns: usize, mut cells: Vec<Vec<String>>) -> Self {
        let widest = cells.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows.min(cells.len().max(MAX_DECLARED_DIMENSION)).max(1);
        let columns = columns.min(widest.max(MAX_DECLARED_DIMENSION)).max(1);
        cells.resize_with(rows, Vec::new);
        for row in &mut cells {
            row.resize(columns, String::new());
        }
        Self {
            rows,
            columns,
            cells,
        }
    }

    /// Builds a table sized by its widest row.
    pub fn from_rows(cells: Vec<Vec<String>>) -> Self {
        let rows = cells.len();
        let columns = cells.iter().map(Vec::len).max().unwrap_or(0);
        Self::from_cells(rows, columns, cells)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cells(&self) -> &[Vec<String>] {
        &self.cells
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.cells
            .get(row)
            .and_then(|cells| cells.get(col))
            .map(String::as_str)
    }

    /// Returns true when the stored shape matches the declared dimensions.
    pub fn is_rectangular(&self) -> bool {
        self.rows >= 1
            && self.columns >= 1
            && self.cells.len() == self.rows
            && self.cells.iter().all(|row| row.len() == self.columns)
    }

    pub fn set_cell(
        &mut self,
        row: usize,
        col: usize,
        text: impl Into<String>,
    ) -> Result<(), TableError> {
        let cell = self
            .cells
            .get_mut(row)
            .and_then(|cells| cells.get_mut(col))
            .ok_or(TableError::OutOfRange {
                row: Some(row),
                col: Some(col),
            })?;
        *cell = text.into();
        Ok(())
    }

    /// Appends a row of empty cells matching the current column count.
    pub fn add_row(&mut self) {
        self.cells.push(vec![String::new(); self.columns]);
        self.rows += 1;
    }

    /// Appends an empty cell to every existing row.
    pub fn add_column(&mut self) {
        for row in &mut self.cells {
            row.push(String::new());
        }
        self.columns += 1;
    }

    /// Removes one row; `None` removes the last row.
    pub fn remove_row(&mut self, index: Option<usize>) -> Result<(), TableError> {
        if self.rows <= 1 {
            return Err(TableError::Floor);
        }
        let index = index.unwrap_or(self.rows - 1);
        if index >= self.rows {
            return Err(TableError::OutOfRange {
                row: Some(index),
                col: None,
            });
        }
        self.cells.remove(index);
        self.rows -= 1;
        Ok(())
    }

    /// Removes one column from every row; `None` removes the last column.
    pub fn remove_column(&mut self, index: Option<usize>) -> Result<(), TableError> {
        if self.columns <= 1 {
            return Err(TableError::Floor);
        }
        let index = index.unwrap_or(self.columns - 1);
        if index >= self.columns {
            return Err(TableError::OutOfRange {
                row: None,
                col: Some(index),
            });
        }
        for row in &mut self.cells {
            row.remove(index);
        }
        self.columns -= 1;
        Ok(())
    }

    /// Returns true when any cell carries non-whitespace text.
    pub fn has_text(&self) -> bool {
        self.cells
            .iter()
            .flatten()
            .any(|cell| !cell.trim().is_empty())
    }

    /// Cell text per row, joined by single spaces.
    pub fn row_lines(&self) -> Vec<String> {
        self.cells.iter().map(|row| row.join(" ")).collect()
    }
}

impl Default for TableData {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_ROWS, DEFAULT_TABLE_COLUMNS)
    }
}

#[cfg(test)]
mod tests {
    use super::{TableData, TableError, MAX_DECLARED_DIMENSION};

    #[test]
    fn from_cells_pads_and_truncates_ragged_input() {
        let table = TableData::from_cells(
            2,
            2,
            vec![
                vec!["a".to_string()],
                vec!["b".to_string(), "c".to_string(), "d".to_string()],
                vec!["e".to_string()],
            ],
        );
        assert!(table.is_rectangular());
        assert_eq!(table.cell(0, 1), Some(""));
        assert_eq!(table.cell(1, 1), Some("c"));
        assert_eq!(table.cell(2, 0), None);
    }

    #[test]
    fn removal_below_floor_is_rejected() {
        let mut table = TableData::new(1, 1);
        assert_eq!(table.remove_row(None), Err(TableError::Floor));
        assert_eq!(table.remove_column(Some(0)), Err(TableError::Floor));
        assert!(table.is_rectangular());
    }

    #[test]
    fn huge_declared_sizes_stop_at_the_cap() {
        let table = TableData::from_cells(usize::MAX, 2, vec![vec!["a".to_string()]]);
        assert_eq!((table.rows(), table.columns()), (MAX_DECLARED_DIMENSION, 2));
        assert!(table.is_rectangular());
    }

    #[test]
    fn zero_sizes_are_raised_to_one() {
        let table = TableData::new(0, 0);
        assert_eq!((table.rows(), table.columns()), (1, 1));
    }
}
