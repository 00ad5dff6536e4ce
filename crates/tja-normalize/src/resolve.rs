//! Inheritance resolution.
//!
//! Every entity is merged with its ancestor chain: for `inherits = p1..pk`
//! the chain is `chain(p1), p1, .., chain(pk), pk` followed by the entity.
//! Shared ancestors are not deduplicated, each occurrence re-applies its
//! values.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use tja_model::{
    AnalyzerConfig, AnalyzerError, INDEX_COLUMN, NAME_COLUMN, NORMALIZED_TABLE, NULL_MARKER,
    Result, Table, append_list_value, split_list,
};

/// How a column's ancestor values fold into the running value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// `"null"` resets, any other non-empty value overwrites.
    Scalar,
    /// `"null"` resets, any other value overwrites, empty included.
    Public,
    /// Empty skips, `"null"` resets, otherwise comma-append.
    List,
    /// Accumulates the names of the ancestors themselves.
    Inherits,
    /// Taken from the entity's own row.
    Identity,
}

impl MergePolicy {
    pub fn for_column(column: &str, config: &AnalyzerConfig) -> Self {
        if column == INDEX_COLUMN || column == NAME_COLUMN {
            Self::Identity
        } else if column == config.inherits_column {
            Self::Inherits
        } else if column == config.public_column {
            Self::Public
        } else if config.is_list_column(column) {
            Self::List
        } else {
            Self::Scalar
        }
    }

    /// Folds one ancestor's cell into `running`.
    pub fn merge(self, running: &mut String, value: &str) {
        match self {
            Self::Scalar if value == NULL_MARKER => running.clear(),
            Self::Scalar if !value.is_empty() => value.clone_into(running),
            Self::Public if value == NULL_MARKER => running.clear(),
            Self::Public => value.clone_into(running),
            Self::List if value == NULL_MARKER => running.clear(),
            Self::List if !value.is_empty() => *running = append_list_value(running, value),
            Self::Scalar | Self::List | Self::Inherits | Self::Identity => {}
        }
    }
}

/// Merges every entity with its ancestor chain.
///
/// Rows are emitted in ascending `Inx` order. The result keeps every column
/// of `boards`, `_add`/`_remove` companions included; see
/// [`reconcile_add_remove`](crate::reconcile_add_remove).
pub fn resolve_inheritance(boards: &Table, config: &AnalyzerConfig) -> Result<Table> {
    let name_column = require_column(boards, NAME_COLUMN)?;
    let policies: Vec<MergePolicy> = boards
        .column_names()
        .map(|column| MergePolicy::for_column(column, config))
        .collect();

    let mut chains = ChainResolver::new(boards, name_column, config);
    let mut normalized = Table::new(NORMALIZED_TABLE);
    for column in boards.columns() {
        normalized.ensure_column_with_default(&column.name, &column.default);
    }

    for row in declaration_order(boards) {
        let ancestors = chains.ancestors(row)?;
        trace!(
            entity = boards.value(row, name_column),
            chain_length = ancestors.len(),
            "resolved ancestor chain"
        );
        let mut merged: Vec<String> = vec![String::new(); policies.len()];
        for &member in ancestors.iter().chain(std::iter::once(&row)) {
            for (column, policy) in policies.iter().enumerate() {
                policy.merge(&mut merged[column], boards.value(member, column));
            }
        }
        for (column, policy) in policies.iter().enumerate() {
            match policy {
                MergePolicy::Identity => boards.value(row, column).clone_into(&mut merged[column]),
                MergePolicy::Inherits => {
                    merged[column] = ancestors
                        .iter()
                        .map(|&ancestor| boards.value(ancestor, name_column))
                        .collect::<Vec<_>>()
                        .join(",");
                }
                _ => {}
            }
        }
        let target = normalized.push_row();
        for (column, value) in merged.into_iter().enumerate() {
            normalized.set(target, column, value);
        }
    }

    debug!(
        entity_count = normalized.row_count(),
        column_count = normalized.column_count(),
        "resolved inheritance"
    );
    Ok(normalized)
}

fn require_column(table: &Table, column: &str) -> Result<usize> {
    table
        .column_index(column)
        .ok_or_else(|| AnalyzerError::MissingColumn {
            table: table.name().to_string(),
            column: column.to_string(),
        })
}

/// Row indices sorted by `Inx`; rows without a numeric index keep their
/// position after the indexed ones.
fn declaration_order(boards: &Table) -> Vec<usize> {
    let index_column = boards.column_index(INDEX_COLUMN);
    let mut rows: Vec<usize> = (0..boards.row_count()).collect();
    rows.sort_by_key(|&row| {
        index_column
            .and_then(|column| boards.value(row, column).parse::<usize>().ok())
            .unwrap_or(usize::MAX)
    });
    rows
}

struct ChainFrame {
    row: usize,
    parents: Vec<usize>,
    next: usize,
}

/// Computes flattened ancestor chains with an explicit stack, memoized per
/// entity.
struct ChainResolver<'t> {
    table: &'t Table,
    name_column: usize,
    inherits_column: Option<usize>,
    rows_by_name: BTreeMap<&'t str, usize>,
    memo: BTreeMap<usize, Vec<usize>>,
}

impl<'t> ChainResolver<'t> {
    fn new(table: &'t Table, name_column: usize, config: &AnalyzerConfig) -> Self {
        let mut rows_by_name = BTreeMap::new();
        for row in 0..table.row_count() {
            rows_by_name
                .entry(table.value(row, name_column))
                .or_insert(row);
        }
        Self {
            table,
            name_column,
            inherits_column: table.column_index(&config.inherits_column),
            rows_by_name,
            memo: BTreeMap::new(),
        }
    }

    fn name(&self, row: usize) -> &'t str {
        self.table.value(row, self.name_column)
    }

    fn frame(&self, row: usize) -> Result<ChainFrame> {
        let mut parents = Vec::new();
        if let Some(column) = self.inherits_column {
            for parent in split_list(self.table.value(row, column)) {
                if parent == NULL_MARKER {
                    continue;
                }
                let Some(&parent_row) = self.rows_by_name.get(parent) else {
                    return Err(AnalyzerError::MissingParent {
                        entity: self.name(row).to_string(),
                        parent: parent.to_string(),
                    });
                };
                parents.push(parent_row);
            }
        }
        Ok(ChainFrame {
            row,
            parents,
            next: 0,
        })
    }

    /// Ancestors of `row`, oldest first, excluding `row` itself.
    fn ancestors(&mut self, row: usize) -> Result<Vec<usize>> {
        if let Some(chain) = self.memo.get(&row) {
            return Ok(chain.clone());
        }
        let mut stack = vec![self.frame(row)?];
        loop {
            let Some(top) = stack.last_mut() else {
                break;
            };
            if let Some(&parent) = top.parents.get(top.next) {
                top.next += 1;
                if self.memo.contains_key(&parent) {
                    continue;
                }
                if let Some(start) = stack.iter().position(|frame| frame.row == parent) {
                    let mut path: Vec<String> = stack[start..]
                        .iter()
                        .map(|frame| self.name(frame.row).to_string())
                        .collect();
                    path.push(self.name(parent).to_string());
                    return Err(AnalyzerError::InheritanceCycle {
                        entity: self.name(row).to_string(),
                        path,
                    });
                }
                let frame = self.frame(parent)?;
                stack.push(frame);
                continue;
            }
            let Some(done) = stack.pop() else {
                break;
            };
            let mut chain = Vec::new();
            for parent in &done.parents {
                if let Some(inherited) = self.memo.get(parent) {
                    chain.extend_from_slice(inherited);
                }
                chain.push(*parent);
            }
            self.memo.insert(done.row, chain);
        }
        Ok(self.memo.get(&row).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boards(rows: &[(&str, &str)]) -> Table {
        let mut table = Table::with_columns("Boards", &["Inx", "BoardName", "inherits"]);
        for (position, (name, inherits)) in rows.iter().enumerate() {
            let row = table.push_row();
            table.set(row, 0, (position + 1).to_string());
            table.set(row, 1, *name);
            table.set(row, 2, *inherits);
        }
        table
    }

    fn chain_names(table: &Table, entity: &str) -> Result<Vec<String>> {
        let config = AnalyzerConfig::default();
        let mut resolver = ChainResolver::new(table, 1, &config);
        let row = table.find_row("BoardName", entity).expect("entity row");
        Ok(resolver
            .ancestors(row)?
            .into_iter()
            .map(|ancestor| table.value(ancestor, 1).to_string())
            .collect())
    }

    #[test]
    fn chains_list_ancestors_before_parents() {
        let table = boards(&[
            ("Target", ""),
            ("A", "Target"),
            ("B", "A"),
            ("C", "Target"),
            ("D", "B,C"),
        ]);
        assert_eq!(
            chain_names(&table, "D").expect("chain"),
            vec!["Target", "A", "B", "Target", "C"]
        );
        assert!(chain_names(&table, "Target").expect("chain").is_empty());
    }

    #[test]
    fn null_inherits_means_no_parent() {
        let table = boards(&[("Target", "null"), ("A", " , Target")]);
        assert_eq!(chain_names(&table, "A").expect("chain"), vec!["Target"]);
    }

    #[test]
    fn cycles_report_the_path() {
        let table = boards(&[("A", "C"), ("B", "A"), ("C", "B")]);
        let error = chain_names(&table, "A").unwrap_err();
        match error {
            AnalyzerError::InheritanceCycle { entity, path } => {
                assert_eq!(entity, "A");
                assert_eq!(path, vec!["A", "C", "B", "A"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn self_inheritance_is_a_cycle() {
        let table = boards(&[("A", "A")]);
        assert!(matches!(
            chain_names(&table, "A"),
            Err(AnalyzerError::InheritanceCycle { .. })
        ));
    }

    #[test]
    fn merge_policies() {
        let mut value = "M0".to_string();
        MergePolicy::Scalar.merge(&mut value, "");
        assert_eq!(value, "M0");
        MergePolicy::Scalar.merge(&mut value, "null");
        assert_eq!(value, "");

        let mut public = "true".to_string();
        MergePolicy::Public.merge(&mut public, "");
        assert_eq!(public, "");

        let mut list = "SERIAL".to_string();
        MergePolicy::List.merge(&mut list, "");
        MergePolicy::List.merge(&mut list, "I2C");
        assert_eq!(list, "SERIAL,I2C");
        MergePolicy::List.merge(&mut list, "null");
        assert_eq!(list, "");
    }

    #[test]
    fn rows_follow_declaration_index() {
        let mut table = boards(&[("Target", ""), ("B", "")]);
        table.set(0, 0, "2");
        table.set(1, 0, "1");
        let normalized =
            resolve_inheritance(&table, &AnalyzerConfig::default()).expect("resolve");
        assert_eq!(normalized.cell(0, "BoardName"), Some("B"));
        assert_eq!(normalized.cell(1, "BoardName"), Some("Target"));
    }
}
