//! Output sinks for analyzed table sets.
//!
//! - **CSV**: one `;`-delimited file per table
//! - **Spreadsheet**: one SpreadsheetML 2003 workbook, a worksheet per table
//! - **SQLite**: one database, a `TEXT`-column table per table

mod common;
mod csv_sink;
mod spreadsheet;
mod sqlite;

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use tja_model::TableSet;

pub use common::{ensure_parent_dir, output_path, output_stem, unique_names};
pub use csv_sink::CsvSink;
pub use spreadsheet::{SpreadsheetSink, worksheet_names};
pub use sqlite::{SqliteSink, quote_identifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Csv,
    Spreadsheet,
    Sqlite,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [Self::Csv, Self::Spreadsheet, Self::Sqlite];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Spreadsheet => "spreadsheet",
            Self::Sqlite => "sqlite",
        }
    }

    /// Sink writing this format into `dir` with file names based on `stem`.
    pub fn sink(self, dir: &Path, stem: &str) -> Box<dyn TableSink> {
        match self {
            Self::Csv => Box::new(CsvSink::new(dir, stem)),
            Self::Spreadsheet => Box::new(SpreadsheetSink::new(dir, stem)),
            Self::Sqlite => Box::new(SqliteSink::new(dir, stem)),
        }
    }
}

/// Serializes a finished table set.
pub trait TableSink {
    fn format(&self) -> OutputFormat;

    /// Writes every table and returns the paths written.
    fn write(&self, tables: &TableSet) -> Result<Vec<PathBuf>>;
}

/// Writes `tables` in each requested format, in order.
pub fn write_outputs(
    tables: &TableSet,
    dir: &Path,
    stem: &str,
    formats: &[OutputFormat],
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for format in formats {
        let sink = format.sink(dir, stem);
        let paths = sink.write(tables)?;
        info!(
            format = sink.format().as_str(),
            file_count = paths.len(),
            "wrote outputs"
        );
        written.extend(paths);
    }
    Ok(written)
}
