//! A name-addressed, columnar table: the shape of the pipeline's raw input
//! and of the Joiner's output before records are typed.
use super::types::Cell;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shape violations raised while building or renaming a `Frame`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("row {row} has {fields} fields, expected {expected}")]
    RaggedRow { row: usize, fields: usize, expected: usize },

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("column '{column}' has {rows} rows, expected {expected}")]
    LengthMismatch { column: String, rows: usize, expected: usize },

    #[error("column '{0}' appears more than once after renaming")]
    RenameCollision(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    // Columnar arrays, parallel to each other.
    names: Vec<String>,
    columns: Vec<Vec<Cell>>,
    rows: usize,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a frame from `(name, column)` pairs. Every column must have the
    /// same length and names must be unique.
    pub fn from_columns<I, S>(columns: I) -> Result<Self, FrameError>
    where
        I: IntoIterator<Item = (S, Vec<Cell>)>,
        S: Into<String>,
    {
        let mut frame = Self::new();
        for (name, cells) in columns {
            frame.push_column(name, cells)?;
        }
        Ok(frame)
    }

    /// Builds a frame from a header row and row-major data.
    pub fn from_rows(header: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, FrameError> {
        let mut columns: Vec<Vec<Cell>> = vec![Vec::with_capacity(rows.len()); header.len()];
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != header.len() {
                return Err(FrameError::RaggedRow { row: i, fields: row.len(), expected: header.len() });
            }
            for (col, cell) in columns.iter_mut().zip(row) {
                col.push(cell);
            }
        }
        Self::from_columns(header.into_iter().zip(columns))
    }

    pub fn push_column(&mut self, name: impl Into<String>, cells: Vec<Cell>) -> Result<(), FrameError> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(FrameError::DuplicateColumn(name));
        }
        if !self.names.is_empty() && cells.len() != self.rows {
            return Err(FrameError::LengthMismatch { column: name, rows: cells.len(), expected: self.rows });
        }
        self.rows = cells.len();
        self.names.push(name);
        self.columns.push(cells);
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.position(name).map(|i| self.columns[i].as_slice())
    }

    pub fn cell(&self, name: &str, row: usize) -> Option<&Cell> {
        self.column(name)?.get(row)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Cell])> {
        self.names.iter().map(String::as_str).zip(self.columns.iter().map(Vec::as_slice))
    }

    /// Applies `f` to every column name. Fails if two names end up equal.
    pub fn rename_columns(&mut self, mut f: impl FnMut(&str) -> String) -> Result<(), FrameError> {
        let renamed: Vec<String> = self.names.iter().map(|n| f(n.as_str())).collect();
        for (i, name) in renamed.iter().enumerate() {
            if renamed[..i].contains(name) {
                return Err(FrameError::RenameCollision(name.clone()));
            }
        }
        self.names = renamed;
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}
