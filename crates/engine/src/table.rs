//! Column-oriented in-memory table.
//!
//! Columns are uniquely named and kept in insertion order; every column holds
//! exactly `row_count` cells. Readers build tables, the merge core only reads
//! them (and builds a fresh one for output).

use std::fmt;

use serde::Serialize;

use crate::cell::CellValue;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableError {
    /// A column with this name already exists.
    DuplicateColumn(String),
    /// Column length differs from the table's row count.
    LengthMismatch { column: String, expected: usize, found: usize },
    /// A data row has more fields than there are headers.
    RowTooLong { row: usize, expected: usize, found: usize },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateColumn(name) => write!(f, "duplicate column name '{name}'"),
            Self::LengthMismatch { column, expected, found } => write!(
                f,
                "column '{column}' has {found} values, table has {expected} rows"
            ),
            Self::RowTooLong { row, expected, found } => write!(
                f,
                "row {row} has {found} fields, only {expected} headers"
            ),
        }
    }
}

impl std::error::Error for TableError {}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a header row and row-major data.
    /// Short rows are padded with `Empty`.
    pub fn from_rows<H, R>(headers: H, rows: R) -> Result<Self, TableError>
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = Vec<CellValue>>,
    {
        let names: Vec<String> = headers.into_iter().map(Into::into).collect();
        let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); names.len()];
        let mut row_count = 0;

        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() > names.len() {
                return Err(TableError::RowTooLong {
                    row: row_idx,
                    expected: names.len(),
                    found: row.len(),
                });
            }
            let width = row.len();
            for (col_idx, value) in row.into_iter().enumerate() {
                columns[col_idx].push(value);
            }
            for column in columns.iter_mut().skip(width) {
                column.push(CellValue::Empty);
            }
            row_count += 1;
        }

        let mut table = Table { columns: Vec::with_capacity(names.len()), row_count };
        for (name, values) in names.into_iter().zip(columns) {
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    /// Append a column. The first column pushed onto an empty table sets the row count.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<CellValue>,
    ) -> Result<(), TableError> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(TableError::DuplicateColumn(name));
        }
        if self.columns.is_empty() {
            self.row_count = values.len();
        } else if values.len() != self.row_count {
            return Err(TableError::LengthMismatch {
                column: name,
                expected: self.row_count,
                found: values.len(),
            });
        }
        self.columns.push(Column { name, values });
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.column(column).and_then(|c| c.values.get(row))
    }

    /// Row-major view, one `Vec` of cell references per row.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&CellValue>> + '_ {
        (0..self.row_count).map(move |r| self.columns.iter().map(|c| &c.values[r]).collect())
    }
}
