use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::path::Path;

use super::{DataBackend, LoadedTable, Table};
use crate::errors::{AgentError, AgentResult};

const COLUMNAR_EXTENSIONS: &[&str] = &["parquet", "arrow", "feather", "orc"];

/// Loads CSV files into a private in-memory SQLite database
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteBackend;

impl SqliteBackend {
    pub fn new() -> Self {
        Self
    }
}

impl DataBackend for SqliteBackend {
    fn load(&self, path: &Path, table_name: &str) -> AgentResult<Box<dyn LoadedTable>> {
        if !path.is_file() {
            return Err(AgentError::DataAccess(format!(
                "data file {} does not exist",
                path.display()
            )));
        }
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if COLUMNAR_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
                return Err(AgentError::DataAccess(format!(
                    "{} is a {} file; only CSV data files are supported",
                    path.display(),
                    ext
                )));
            }
        }

        let conn = Connection::open_in_memory()?;
        rusqlite::vtab::csvtab::load_module(&conn)?;

        let source = quote_identifier(&format!("{}_source", table_name));
        let table = quote_identifier(table_name);
        conn.execute_batch(&format!(
            "CREATE VIRTUAL TABLE temp.{} USING csv(filename={}, header=yes);",
            source,
            quote_literal(&path.to_string_lossy()),
        ))?;

        let columns: Vec<String> = {
            let stmt = conn.prepare(&format!("SELECT * FROM temp.{} LIMIT 0", source))?;
            stmt.column_names().into_iter().map(String::from).collect()
        };

        // csv columns are all TEXT; NUMERIC affinity turns numeric-looking values into
        // INTEGER/REAL so comparisons and ordering are numeric. Empty cells become NULL.
        let quoted: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
        let definitions: Vec<String> = quoted.iter().map(|c| format!("{} NUMERIC", c)).collect();
        let values: Vec<String> = quoted
            .iter()
            .map(|c| format!("NULLIF(TRIM({}), '')", c))
            .collect();
        conn.execute_batch(&format!(
            "CREATE TABLE main.{table} ({definitions});
             INSERT INTO main.{table} SELECT {values} FROM temp.{source};
             DROP TABLE temp.{source};",
            table = table,
            definitions = definitions.join(", "),
            values = values.join(", "),
            source = source,
        ))?;

        tracing::debug!(path = %path.display(), table = table_name, "loaded data file");

        Ok(Box::new(SqliteTable {
            conn,
            table_name: table_name.to_string(),
            columns,
        }))
    }
}

struct SqliteTable {
    conn: Connection,
    table_name: String,
    columns: Vec<String>,
}

impl LoadedTable for SqliteTable {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn query(&self, sql: &str) -> AgentResult<Table> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query([])?;
        let mut table_rows = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                cells.push(render_value(row.get_ref(i)?));
            }
            table_rows.push(cells);
        }

        Ok(Table::new(columns, table_rows))
    }
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(text) => String::from_utf8_lossy(text).into_owned(),
        ValueRef::Blob(blob) => format!("<{} bytes>", blob.len()),
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
