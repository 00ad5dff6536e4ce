use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::WriterBuilder;
use tracing::debug;

use tja_model::{Table, TableSet};

use crate::common::{ensure_parent_dir, output_path};
use crate::{OutputFormat, TableSink};

/// One `<stem>.<Table>.csv` file per table, `;`-delimited with a header row.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
    stem: String,
}

impl CsvSink {
    pub fn new(dir: &Path, stem: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            stem: stem.to_string(),
        }
    }

    pub fn table_path(&self, table: &Table) -> PathBuf {
        output_path(&self.dir, &self.stem, &format!(".{}.csv", table.name()))
    }
}

impl TableSink for CsvSink {
    fn format(&self) -> OutputFormat {
        OutputFormat::Csv
    }

    fn write(&self, tables: &TableSet) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(tables.len());
        for table in tables {
            let path = self.table_path(table);
            write_table(&path, table)?;
            debug!(table = table.name(), path = %path.display(), "wrote csv");
            written.push(path);
        }
        Ok(written)
    }
}

fn write_table(path: &Path, table: &Table) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut writer = WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    writer
        .write_record(table.column_names())
        .with_context(|| format!("write header of {}", path.display()))?;
    for row in table.rows() {
        writer
            .write_record(row)
            .with_context(|| format!("write row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}
