use std::path::{Path, PathBuf};

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use tja_output::OutputFormat;

use crate::types::{AnalyzeResult, TableSummary};

pub fn print_summary(result: &AnalyzeResult) {
    println!("Input: {}", result.input.display());
    if result.dry_run {
        println!("Output: (dry run)");
    } else {
        println!("Output: {}", result.output_dir.display());
    }
    let mut table = Table::new();
    let mut header = vec![
        header_cell("Table"),
        header_cell("Rows"),
        header_cell("Columns"),
    ];
    header.extend(result.formats.iter().map(|format| header_cell(format_label(*format))));
    table.set_header(header);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for index in 0..result.formats.len() {
        align_column(&mut table, 3 + index, CellAlignment::Center);
    }

    let mut total_rows = 0usize;
    for summary in &result.tables {
        total_rows += summary.rows;
        let mut row = vec![
            table_cell(summary),
            Cell::new(summary.rows),
            Cell::new(summary.columns),
        ];
        row.extend(
            result
                .formats
                .iter()
                .map(|format| output_cell(written_for(&result.written, *format, &summary.name))),
        );
        table.add_row(row);
    }
    let mut total = vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ];
    total.extend(result.formats.iter().map(|_| dim_cell("-")));
    table.add_row(total);
    println!("{table}");

    if !result.written.is_empty() {
        println!("Files:");
        for path in &result.written {
            println!("- {}", path.display());
        }
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

/// CSV writes one file per table; the other formats hold every table in one file.
fn written_for<'a>(written: &'a [PathBuf], format: OutputFormat, table: &str) -> Option<&'a PathBuf> {
    let suffix = match format {
        OutputFormat::Csv => format!(".{table}.csv"),
        OutputFormat::Spreadsheet => ".xml".to_string(),
        OutputFormat::Sqlite => ".db".to_string(),
    };
    written.iter().find(|path| file_name(path).ends_with(&suffix))
}

fn file_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
}

fn format_label(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Csv => "CSV",
        OutputFormat::Spreadsheet => "XML",
        OutputFormat::Sqlite => "SQLite",
    }
}

fn table_cell(summary: &TableSummary) -> Cell {
    if summary.rows == 0 {
        Cell::new(&summary.name).fg(Color::DarkGrey)
    } else {
        Cell::new(&summary.name)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold)
    }
}

fn output_cell(path: Option<&PathBuf>) -> Cell {
    match path {
        Some(_) => Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        None => dim_cell("-"),
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}
