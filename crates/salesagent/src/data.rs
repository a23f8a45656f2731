//! The tabular data backend used by the lookup tool.
//!
//! A backend materializes a data file as an ephemeral named table and runs ad-hoc SQL
//! against it. Results come back as a [`Table`], which is rendered to text before it
//! re-enters the transcript.
//!
//! Only CSV files with a header row are supported. Columnar formats such as parquet
//! are refused by [`SqliteBackend`] with a `DataAccess` error, so the configured
//! `TRANSACTION_DATA_FILE_PATH` must point at a CSV export.
use std::fmt;
use std::path::Path;

use crate::errors::AgentResult;

pub mod sqlite;

pub use sqlite::SqliteBackend;

pub trait DataBackend: Send + Sync {
    /// Materialize the file at `path` as a queryable table called `table_name`
    fn load(&self, path: &Path, table_name: &str) -> AgentResult<Box<dyn LoadedTable>>;
}

/// A table loaded by a [`DataBackend`], dropped once the tool invocation ends
pub trait LoadedTable: Send {
    fn table_name(&self) -> &str;

    fn columns(&self) -> &[String];

    fn query(&self, sql: &str) -> AgentResult<Table>;
}

/// An in-memory query result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for Table {
    /// Columns are right aligned under their headers, with a leading row index
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return write!(f, "Empty result\nColumns: [{}]", self.columns.join(", "));
        }

        let index_width = (self.rows.len() - 1).to_string().len();
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        write!(f, "{:index_width$}", "")?;
        for (column, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", column, width = *width)?;
        }

        for (index, row) in self.rows.iter().enumerate() {
            write!(f, "\n{:<index_width$}", index)?;
            for (cell, width) in row.iter().zip(&widths) {
                write!(f, "  {:>width$}", cell, width = *width)?;
            }
        }
        Ok(())
    }
}
