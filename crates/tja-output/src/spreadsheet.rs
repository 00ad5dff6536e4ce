//! SpreadsheetML 2003 workbook output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use tracing::debug;

use tja_model::{Table, TableSet};

use crate::common::{ensure_parent_dir, output_path, unique_names};
use crate::{OutputFormat, TableSink};

const SPREADSHEET_NS: &str = "urn:schemas-microsoft-com:office:spreadsheet";
const OFFICE_NS: &str = "urn:schemas-microsoft-com:office:office";
const HEADER_STYLE: &str = "header";
/// Excel rejects worksheet names longer than this.
const MAX_SHEET_NAME: usize = 31;

/// `<stem>.xml` workbook with one worksheet per table, header row first.
#[derive(Debug, Clone)]
pub struct SpreadsheetSink {
    path: PathBuf,
}

impl SpreadsheetSink {
    pub fn new(dir: &Path, stem: &str) -> Self {
        Self {
            path: output_path(dir, stem, ".xml"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSink for SpreadsheetSink {
    fn format(&self) -> OutputFormat {
        OutputFormat::Spreadsheet
    }

    fn write(&self, tables: &TableSet) -> Result<Vec<PathBuf>> {
        ensure_parent_dir(&self.path)?;
        let file =
            File::create(&self.path).with_context(|| format!("create {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        write_workbook(&mut writer, tables)
            .with_context(|| format!("write {}", self.path.display()))?;
        writer
            .flush()
            .with_context(|| format!("flush {}", self.path.display()))?;
        debug!(path = %self.path.display(), sheet_count = tables.len(), "wrote workbook");
        Ok(vec![self.path.clone()])
    }
}

/// Worksheet names: invalid characters replaced, truncated and made unique.
pub fn worksheet_names(tables: &TableSet) -> Vec<String> {
    let cleaned: Vec<String> = tables
        .iter()
        .map(|table| {
            let name: String = table
                .name()
                .chars()
                .map(|ch| match ch {
                    '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
                    other => other,
                })
                .take(MAX_SHEET_NAME)
                .collect();
            if name.is_empty() {
                "Sheet".to_string()
            } else {
                name
            }
        })
        .collect();
    unique_names(cleaned.iter().map(String::as_str))
}

fn write_workbook<W: Write>(out: W, tables: &TableSet) -> Result<()> {
    let mut xml = Writer::new_with_indent(out, b' ', 2);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml.write_event(Event::PI(BytesPI::new(
        "mso-application progid=\"Excel.Sheet\"",
    )))?;

    let mut workbook = BytesStart::new("Workbook");
    workbook.push_attribute(("xmlns", SPREADSHEET_NS));
    workbook.push_attribute(("xmlns:o", OFFICE_NS));
    workbook.push_attribute(("xmlns:ss", SPREADSHEET_NS));
    xml.write_event(Event::Start(workbook))?;

    let created = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut properties = BytesStart::new("DocumentProperties");
    properties.push_attribute(("xmlns", OFFICE_NS));
    xml.write_event(Event::Start(properties))?;
    write_text_element(&mut xml, "Created", &created)?;
    xml.write_event(Event::End(BytesEnd::new("DocumentProperties")))?;

    xml.write_event(Event::Start(BytesStart::new("Styles")))?;
    let mut style = BytesStart::new("Style");
    style.push_attribute(("ss:ID", HEADER_STYLE));
    xml.write_event(Event::Start(style))?;
    let mut font = BytesStart::new("Font");
    font.push_attribute(("ss:Bold", "1"));
    xml.write_event(Event::Empty(font))?;
    xml.write_event(Event::End(BytesEnd::new("Style")))?;
    xml.write_event(Event::End(BytesEnd::new("Styles")))?;

    for (table, sheet_name) in tables.iter().zip(worksheet_names(tables)) {
        write_worksheet(&mut xml, table, &sheet_name)?;
    }

    xml.write_event(Event::End(BytesEnd::new("Workbook")))?;
    Ok(())
}

fn write_worksheet<W: Write>(xml: &mut Writer<W>, table: &Table, sheet_name: &str) -> Result<()> {
    let mut worksheet = BytesStart::new("Worksheet");
    worksheet.push_attribute(("ss:Name", sheet_name));
    xml.write_event(Event::Start(worksheet))?;

    let column_count = table.column_count().to_string();
    let row_count = (table.row_count() + 1).to_string();
    let mut sheet_table = BytesStart::new("Table");
    sheet_table.push_attribute(("ss:ExpandedColumnCount", column_count.as_str()));
    sheet_table.push_attribute(("ss:ExpandedRowCount", row_count.as_str()));
    xml.write_event(Event::Start(sheet_table))?;

    xml.write_event(Event::Start(BytesStart::new("Row")))?;
    for name in table.column_names() {
        write_cell(xml, name, Some(HEADER_STYLE))?;
    }
    xml.write_event(Event::End(BytesEnd::new("Row")))?;

    for row in table.rows() {
        xml.write_event(Event::Start(BytesStart::new("Row")))?;
        for value in row {
            write_cell(xml, value, None)?;
        }
        xml.write_event(Event::End(BytesEnd::new("Row")))?;
    }

    xml.write_event(Event::End(BytesEnd::new("Table")))?;
    xml.write_event(Event::End(BytesEnd::new("Worksheet")))?;
    Ok(())
}

fn write_cell<W: Write>(xml: &mut Writer<W>, value: &str, style: Option<&str>) -> Result<()> {
    let mut cell = BytesStart::new("Cell");
    if let Some(style) = style {
        cell.push_attribute(("ss:StyleID", style));
    }
    if value.is_empty() {
        xml.write_event(Event::Empty(cell))?;
        return Ok(());
    }
    xml.write_event(Event::Start(cell))?;
    let mut data = BytesStart::new("Data");
    data.push_attribute(("ss:Type", "String"));
    xml.write_event(Event::Start(data))?;
    xml.write_event(Event::Text(BytesText::new(value)))?;
    xml.write_event(Event::End(BytesEnd::new("Data")))?;
    xml.write_event(Event::End(BytesEnd::new("Cell")))?;
    Ok(())
}

fn write_text_element<W: Write>(xml: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
