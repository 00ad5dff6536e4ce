//! Readers for extended sections (`config`, `overrides`, `progen`, ...).
//!
//! A section's subtree is laid out in its own table keyed by
//! `(BoardName, Name)` instead of widening the entity table. Readers are
//! created from a name → factory registry the first time their element is
//! seen and reused for the rest of the document.

use std::collections::BTreeMap;

use tracing::debug;

use tja_ingest::{TreeCursor, TreeEvent};
use tja_model::{
    AnalyzerConfig, AnalyzerError, NAME_COLUMN, NULL_MARKER, Result, SECTION_NAME_COLUMN,
    SECTION_VALUE_COLUMN, SectionKind, Table, append_list_value,
};

pub trait SectionReader {
    /// Consumes one occurrence of a section.
    ///
    /// The cursor is positioned just after the section's start event; the
    /// reader returns once it has consumed the matching end event.
    fn read_section(
        &mut self,
        cursor: &mut dyn TreeCursor,
        section: &str,
        owner: &str,
    ) -> Result<()>;

    fn finish(self: Box<Self>) -> Table;
}

pub type SectionFactory = fn(&str) -> Box<dyn SectionReader>;

pub fn factory_for(kind: SectionKind) -> SectionFactory {
    match kind {
        SectionKind::KeyValue => KeyValueReader::boxed,
        SectionKind::Structured => StructuredReader::boxed,
    }
}

struct SectionEntry {
    element: String,
    table: String,
    factory: SectionFactory,
}

/// Section element name → table name and reader factory, in output order.
#[derive(Default)]
pub struct SectionRegistry {
    entries: Vec<SectionEntry>,
}

impl SectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        let mut registry = Self::new();
        for spec in &config.sections {
            registry.register(&spec.element, &spec.table, factory_for(spec.kind));
        }
        registry
    }

    /// Registers a section; re-registering an element replaces its entry.
    pub fn register(&mut self, element: &str, table: &str, factory: SectionFactory) {
        let entry = SectionEntry {
            element: element.to_string(),
            table: table.to_string(),
            factory,
        };
        match self.entries.iter_mut().find(|e| e.element == element) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn contains(&self, element: &str) -> bool {
        self.entries.iter().any(|entry| entry.element == element)
    }

    /// `(element, table)` pairs in registration order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.element.as_str(), entry.table.as_str()))
    }

    fn entry(&self, element: &str) -> Option<&SectionEntry> {
        self.entries.iter().find(|entry| entry.element == element)
    }
}

/// Lazily created readers for one mapping pass.
pub struct SectionReaders<'r> {
    registry: &'r SectionRegistry,
    active: BTreeMap<String, Box<dyn SectionReader>>,
}

impl<'r> SectionReaders<'r> {
    pub fn new(registry: &'r SectionRegistry) -> Self {
        Self {
            registry,
            active: BTreeMap::new(),
        }
    }

    pub fn contains(&self, element: &str) -> bool {
        self.registry.contains(element)
    }

    pub fn read(&mut self, cursor: &mut dyn TreeCursor, element: &str, owner: &str) -> Result<()> {
        let Some(entry) = self.registry.entry(element) else {
            return Err(AnalyzerError::Message(format!(
                "no reader registered for section '{element}'"
            )));
        };
        let reader = self.active.entry(element.to_string()).or_insert_with(|| {
            debug!(section = %element, table = %entry.table, "creating section reader");
            (entry.factory)(&entry.table)
        });
        reader.read_section(cursor, element, owner)
    }

    /// One table per registered section, empty for sections never seen.
    pub fn finish(mut self) -> Vec<Table> {
        self.registry
            .entries
            .iter()
            .map(|entry| match self.active.remove(&entry.element) {
                Some(reader) => reader.finish(),
                None => (entry.factory)(&entry.table).finish(),
            })
            .collect()
    }
}

/// Section table rows keyed by `(owner, item)`.
struct SectionRows {
    table: Table,
    keys: BTreeMap<(String, String), usize>,
}

impl SectionRows {
    fn new(table: &str, columns: &[&str]) -> Self {
        Self {
            table: Table::with_columns(table, columns),
            keys: BTreeMap::new(),
        }
    }

    fn row_for(&mut self, owner: &str, item: &str) -> usize {
        let key = (owner.to_string(), item.to_string());
        if let Some(&row) = self.keys.get(&key) {
            return row;
        }
        let row = self.table.push_row();
        self.table.set_by_name(row, NAME_COLUMN, owner);
        self.table.set_by_name(row, SECTION_NAME_COLUMN, item);
        self.keys.insert(key, row);
        row
    }

    fn append(&mut self, row: usize, column: &str, value: &str) {
        let index = self.table.ensure_column(column);
        let merged = append_list_value(self.table.value(row, index), value);
        self.table.set(row, index, merged);
    }

    fn mark_nested(&mut self, row: usize, column: &str) {
        self.table.set_by_name(row, column, NULL_MARKER);
    }
}

struct OpenNode {
    name: String,
    row: usize,
    nested: bool,
}

fn next_in_section(cursor: &mut dyn TreeCursor, section: &str) -> Result<TreeEvent> {
    cursor
        .next_event()?
        .ok_or_else(|| AnalyzerError::malformed(format!("document ended inside <{section}>")))
}

/// Returns `true` when `name` closes the section itself.
fn close_node(open: &mut Vec<OpenNode>, name: &str, section: &str) -> Result<bool> {
    match open.pop() {
        Some(node) if node.name == name => Ok(false),
        Some(node) => Err(AnalyzerError::malformed(format!(
            "expected </{}> inside <{section}>, found </{name}>",
            node.name
        ))),
        None if name == section => Ok(true),
        None => Err(AnalyzerError::malformed(format!(
            "unexpected </{name}> inside <{section}>"
        ))),
    }
}

/// One `(BoardName, Name, Value)` row per item.
///
/// Nested items write the `"null"` marker and their descendants become items
/// of their own.
pub struct KeyValueReader {
    rows: SectionRows,
}

impl KeyValueReader {
    pub fn new(table: &str) -> Self {
        Self {
            rows: SectionRows::new(
                table,
                &[NAME_COLUMN, SECTION_NAME_COLUMN, SECTION_VALUE_COLUMN],
            ),
        }
    }

    pub fn boxed(table: &str) -> Box<dyn SectionReader> {
        Box::new(Self::new(table))
    }
}

impl SectionReader for KeyValueReader {
    fn read_section(
        &mut self,
        cursor: &mut dyn TreeCursor,
        section: &str,
        owner: &str,
    ) -> Result<()> {
        let mut open: Vec<OpenNode> = Vec::new();
        loop {
            match next_in_section(cursor, section)? {
                TreeEvent::Start(name) => {
                    if let Some(parent) = open.last_mut()
                        && !parent.nested
                    {
                        parent.nested = true;
                        self.rows.mark_nested(parent.row, SECTION_VALUE_COLUMN);
                    }
                    let row = self.rows.row_for(owner, &name);
                    open.push(OpenNode {
                        name,
                        row,
                        nested: false,
                    });
                }
                TreeEvent::Text(text) => {
                    let row = match open.last() {
                        Some(node) => node.row,
                        None => self.rows.row_for(owner, section),
                    };
                    self.rows.append(row, SECTION_VALUE_COLUMN, &text);
                }
                TreeEvent::End(name) => {
                    if close_node(&mut open, &name, section)? {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn finish(self: Box<Self>) -> Table {
        self.rows.table
    }
}

/// One `(BoardName, Name)` row per item; the item's nested elements become
/// columns of that row and text directly under the item goes to `Value`.
pub struct StructuredReader {
    rows: SectionRows,
}

impl StructuredReader {
    pub fn new(table: &str) -> Self {
        Self {
            rows: SectionRows::new(table, &[NAME_COLUMN, SECTION_NAME_COLUMN]),
        }
    }

    pub fn boxed(table: &str) -> Box<dyn SectionReader> {
        Box::new(Self::new(table))
    }
}

impl SectionReader for StructuredReader {
    fn read_section(
        &mut self,
        cursor: &mut dyn TreeCursor,
        section: &str,
        owner: &str,
    ) -> Result<()> {
        // open[0] is the item, deeper entries are attribute columns of its row.
        let mut open: Vec<OpenNode> = Vec::new();
        loop {
            match next_in_section(cursor, section)? {
                TreeEvent::Start(name) => {
                    let row = match open.first() {
                        Some(item) => item.row,
                        None => self.rows.row_for(owner, &name),
                    };
                    if open.len() >= 2
                        && let Some(parent) = open.last_mut()
                        && !parent.nested
                    {
                        parent.nested = true;
                        self.rows.mark_nested(row, &parent.name);
                    }
                    if !open.is_empty() {
                        self.rows.table.ensure_column(&name);
                    }
                    open.push(OpenNode {
                        name,
                        row,
                        nested: false,
                    });
                }
                TreeEvent::Text(text) => match open.len() {
                    0 => {
                        let row = self.rows.row_for(owner, section);
                        self.rows.append(row, SECTION_VALUE_COLUMN, &text);
                    }
                    1 => {
                        let row = open[0].row;
                        self.rows.append(row, SECTION_VALUE_COLUMN, &text);
                    }
                    _ => {
                        if let Some(node) = open.last() {
                            let (row, column) = (node.row, node.name.clone());
                            self.rows.append(row, &column, &text);
                        }
                    }
                },
                TreeEvent::End(name) => {
                    if close_node(&mut open, &name, section)? {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn finish(self: Box<Self>) -> Table {
        self.rows.table
    }
}
