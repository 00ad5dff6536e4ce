use std::path::PathBuf;

use tja_output::OutputFormat;

#[derive(Debug)]
pub struct AnalyzeResult {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub formats: Vec<OutputFormat>,
    pub tables: Vec<TableSummary>,
    pub written: Vec<PathBuf>,
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct TableSummary {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
}
