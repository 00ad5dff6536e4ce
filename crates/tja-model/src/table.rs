//! String-typed relational tables with columns discovered at runtime.
//!
//! Every cell is a `String`. Column presence is a table-wide property: adding
//! a column back-fills all existing rows with the column's default value, and
//! new rows start out with every column's default.

use std::collections::BTreeMap;

/// A named column and the value new cells receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub default: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    lookup: BTreeMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            lookup: BTreeMap::new(),
            rows: Vec::new(),
        }
    }

    /// Create a table with the given columns, all defaulting to empty.
    pub fn with_columns(name: impl Into<String>, columns: &[&str]) -> Self {
        let mut table = Self::new(name);
        for column in columns {
            table.ensure_column(column);
        }
        table
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// Returns the index of `name`, appending an empty-default column if absent.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        self.ensure_column_with_default(name, "")
    }

    /// Returns the index of `name`, appending it with `default` if absent.
    ///
    /// An existing column keeps its original default.
    pub fn ensure_column_with_default(&mut self, name: &str, default: &str) -> usize {
        if let Some(index) = self.column_index(name) {
            return index;
        }
        let index = self.columns.len();
        self.columns.push(Column {
            name: name.to_string(),
            default: default.to_string(),
        });
        self.lookup.insert(name.to_string(), index);
        for row in &mut self.rows {
            row.push(default.to_string());
        }
        index
    }

    /// Removes a column and its cells. Returns `false` if it did not exist.
    pub fn remove_column(&mut self, name: &str) -> bool {
        let Some(index) = self.column_index(name) else {
            return false;
        };
        self.columns.remove(index);
        for row in &mut self.rows {
            row.remove(index);
        }
        self.lookup = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| (column.name.clone(), index))
            .collect();
        true
    }

    /// Appends a row filled with column defaults and returns its index.
    pub fn push_row(&mut self) -> usize {
        let row = self
            .columns
            .iter()
            .map(|column| column.default.clone())
            .collect();
        self.rows.push(row);
        self.rows.len() - 1
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> &[String] {
        &self.rows[row]
    }

    /// Cell value by position.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `column` is out of bounds.
    pub fn value(&self, row: usize, column: usize) -> &str {
        &self.rows[row][column]
    }

    /// Cell value by column name, `None` when the column does not exist.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|cells| cells[index].as_str())
    }

    pub fn set(&mut self, row: usize, column: usize, value: impl Into<String>) {
        self.rows[row][column] = value.into();
    }

    /// Sets a cell by column name, adding the column when needed.
    pub fn set_by_name(&mut self, row: usize, column: &str, value: impl Into<String>) {
        let index = self.ensure_column(column);
        self.set(row, index, value);
    }

    /// First row whose `column` equals `value`.
    pub fn find_row(&self, column: &str, value: &str) -> Option<usize> {
        let index = self.column_index(column)?;
        self.rows.iter().position(|row| row[index] == value)
    }
}

/// Insertion-ordered registry of named tables.
#[derive(Debug, Clone, Default)]
pub struct TableSet {
    tables: Vec<Table>,
}

impl TableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table, replacing an existing one with the same name in place.
    pub fn insert(&mut self, table: Table) {
        match self.tables.iter_mut().find(|t| t.name() == table.name()) {
            Some(existing) => *existing = table,
            None => self.tables.push(table),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|table| table.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tables.iter().map(Table::name).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn into_tables(self) -> Vec<Table> {
        self.tables
    }
}

impl<'a> IntoIterator for &'a TableSet {
    type Item = &'a Table;
    type IntoIter = std::slice::Iter<'a, Table>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_columns_backfill_existing_rows() {
        let mut table = Table::with_columns("Boards", &["Inx"]);
        let first = table.push_row();
        table.set(first, 0, "1");
        let flag = table.ensure_column_with_default("SERIAL", "false");
        let second = table.push_row();

        assert_eq!(table.value(first, flag), "false");
        assert_eq!(table.value(second, flag), "false");
        assert_eq!(table.value(second, 0), "");
    }

    #[test]
    fn ensure_column_is_idempotent() {
        let mut table = Table::new("Boards");
        let a = table.ensure_column("core");
        let b = table.ensure_column_with_default("core", "false");
        assert_eq!(a, b);
        assert_eq!(table.column_count(), 1);
        assert_eq!(table.columns()[0].default, "");
    }

    #[test]
    fn remove_column_reindexes_lookup() {
        let mut table = Table::with_columns("Boards", &["a", "b", "c"]);
        let row = table.push_row();
        table.set_by_name(row, "c", "last");
        assert!(table.remove_column("b"));
        assert!(!table.remove_column("b"));
        assert_eq!(table.column_index("c"), Some(1));
        assert_eq!(table.cell(row, "c"), Some("last"));
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn table_set_replaces_by_name() {
        let mut set = TableSet::new();
        set.insert(Table::with_columns("Boards", &["a"]));
        set.insert(Table::with_columns("Config", &["a"]));
        set.insert(Table::with_columns("Boards", &["a", "b"]));
        assert_eq!(set.names(), vec!["Boards", "Config"]);
        assert_eq!(set.get("Boards").map(Table::column_count), Some(2));
    }
}
