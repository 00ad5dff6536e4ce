//! Folds `<column>_add` / `<column>_remove` companions into their base column.

use tracing::debug;

use tja_model::{
    ADD_SUFFIX, NULL_MARKER, Table, append_list_value, companion_base, remove_list_items,
};

struct Companions {
    base: String,
    add: Option<String>,
    remove: Option<String>,
}

fn companion_groups(table: &Table) -> Vec<Companions> {
    let mut groups: Vec<Companions> = Vec::new();
    for column in table.column_names() {
        let Some((base, suffix)) = companion_base(column) else {
            continue;
        };
        let position = match groups.iter().position(|group| group.base == base) {
            Some(position) => position,
            None => {
                groups.push(Companions {
                    base: base.to_string(),
                    add: None,
                    remove: None,
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[position];
        if suffix == ADD_SUFFIX {
            group.add = Some(column.to_string());
        } else {
            group.remove = Some(column.to_string());
        }
    }
    groups
}

/// Appends every `_add` value to its base column, then strips every token
/// listed in `_remove`, and finally drops the companion columns.
///
/// Removal is a token-set difference, so removing `I2C` leaves `I2C1` in
/// place. A base column missing from the table is created. Returns the number
/// of companion columns dropped.
pub fn reconcile_add_remove(table: &mut Table) -> usize {
    let groups = companion_groups(table);
    let mut dropped = 0;
    for group in &groups {
        let base = table.ensure_column(&group.base);
        let add = group.add.as_deref().and_then(|name| table.column_index(name));
        let remove = group.remove.as_deref().and_then(|name| table.column_index(name));
        for row in 0..table.row_count() {
            let mut value = table.value(row, base).to_string();
            if let Some(column) = add {
                let added = table.value(row, column);
                if !added.is_empty() && added != NULL_MARKER {
                    value = append_list_value(&value, added);
                }
            }
            if let Some(column) = remove {
                let removed = table.value(row, column);
                if !removed.is_empty() {
                    value = remove_list_items(&value, removed);
                }
            }
            table.set(row, base, value);
        }
        for companion in [&group.add, &group.remove].into_iter().flatten() {
            if table.remove_column(companion) {
                dropped += 1;
            }
        }
        debug!(column = %group.base, "reconciled add/remove companions");
    }
    dropped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_remove() {
        let mut table = Table::with_columns(
            "Normalized_Boards",
            &["BoardName", "macros", "macros_remove", "macros_add"],
        );
        let row = table.push_row();
        table.set(row, 0, "K64F");
        table.set(row, 1, "A,B");
        table.set(row, 2, "B,C");
        table.set(row, 3, "C,D");

        assert_eq!(reconcile_add_remove(&mut table), 2);
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["BoardName", "macros"]
        );
        assert_eq!(table.cell(row, "macros"), Some("A,D"));
    }

    #[test]
    fn missing_base_columns_are_created() {
        let mut table =
            Table::with_columns("Normalized_Boards", &["BoardName", "features_add"]);
        let row = table.push_row();
        table.set(row, 1, "BLE");
        reconcile_add_remove(&mut table);
        assert_eq!(table.cell(row, "features"), Some("BLE"));
        assert!(!table.has_column("features_add"));
    }

    #[test]
    fn tables_without_companions_are_untouched() {
        let mut table = Table::with_columns("Normalized_Boards", &["BoardName", "core"]);
        table.push_row();
        let before = table.clone();
        assert_eq!(reconcile_add_remove(&mut table), 0);
        assert_eq!(table, before);
    }
}
