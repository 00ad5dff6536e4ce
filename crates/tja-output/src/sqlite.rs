use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{Connection, params_from_iter};
use tracing::{debug, warn};

use tja_model::{Table, TableSet};

use crate::common::{ensure_parent_dir, output_path, unique_names};
use crate::{OutputFormat, TableSink};

/// `<stem>.db` with one all-`TEXT` table per table.
///
/// Existing tables of the same name are dropped and recreated; the whole set
/// is written in a single transaction.
#[derive(Debug, Clone)]
pub struct SqliteSink {
    path: PathBuf,
}

impl SqliteSink {
    pub fn new(dir: &Path, stem: &str) -> Self {
        Self {
            path: output_path(dir, stem, ".db"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSink for SqliteSink {
    fn format(&self) -> OutputFormat {
        OutputFormat::Sqlite
    }

    fn write(&self, tables: &TableSet) -> Result<Vec<PathBuf>> {
        ensure_parent_dir(&self.path)?;
        let mut conn = Connection::open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        let tx = conn.transaction().context("begin transaction")?;
        for table in tables {
            write_table(&tx, table).with_context(|| format!("write table {}", table.name()))?;
        }
        tx.commit()
            .with_context(|| format!("commit {}", self.path.display()))?;
        Ok(vec![self.path.clone()])
    }
}

/// Double-quotes an SQL identifier.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn write_table(conn: &Connection, table: &Table) -> Result<()> {
    let name = quote_identifier(table.name());
    conn.execute(&format!("DROP TABLE IF EXISTS {name}"), [])?;
    if table.column_count() == 0 {
        warn!(table = table.name(), "table has no columns, skipped");
        return Ok(());
    }

    let columns: Vec<String> = unique_names(table.column_names())
        .iter()
        .map(|column| quote_identifier(column))
        .collect();
    let definitions: Vec<String> = columns.iter().map(|column| format!("{column} TEXT")).collect();
    conn.execute(
        &format!("CREATE TABLE {name} ({})", definitions.join(", ")),
        [],
    )?;

    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    let mut insert = conn.prepare(&format!(
        "INSERT INTO {name} ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    ))?;
    for row in table.rows() {
        insert.execute(params_from_iter(row.iter()))?;
    }
    debug!(table = table.name(), row_count = table.row_count(), "wrote sqlite table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_identifier("Boards"), "\"Boards\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}
