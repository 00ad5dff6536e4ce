//! List pivot: one boolean column per distinct list item.

use tracing::{debug, warn};

use tja_model::{NULL_MARKER, Table, split_list};

pub const FLAG_TRUE: &str = "true";
pub const FLAG_FALSE: &str = "false";

/// Expands `column` into one `"true"`/`"false"` column per distinct token.
///
/// Tokens are collected across all rows in first-seen order; `"null"` and
/// the column's own name are ignored. Existing flag columns are reused, so
/// pivoting twice gives the same table as pivoting once. A token naming an
/// existing non-flag column is skipped. Returns the number of flag columns
/// the column maps to; a missing column is a no-op.
pub fn pivot_column(table: &mut Table, column: &str) -> usize {
    let Some(source) = table.column_index(column) else {
        debug!(table = table.name(), column, "pivot column not present");
        return 0;
    };

    let row_tokens: Vec<Vec<String>> = (0..table.row_count())
        .map(|row| {
            split_list(table.value(row, source))
                .filter(|token| *token != NULL_MARKER && *token != column)
                .map(str::to_string)
                .collect()
        })
        .collect();

    let mut distinct: Vec<&str> = Vec::new();
    for token in row_tokens.iter().flatten() {
        if !distinct.contains(&token.as_str()) {
            distinct.push(token);
        }
    }

    let mut flags: Vec<(&str, usize)> = Vec::with_capacity(distinct.len());
    for token in distinct {
        if let Some(existing) = table.columns().iter().find(|c| c.name == token) {
            if existing.default != FLAG_FALSE {
                warn!(
                    table = table.name(),
                    column,
                    token,
                    "list item collides with an existing column, skipped"
                );
                continue;
            }
        }
        flags.push((token, table.ensure_column_with_default(token, FLAG_FALSE)));
    }

    for (row, tokens) in row_tokens.iter().enumerate() {
        for (token, index) in &flags {
            if tokens.iter().any(|t| t == token) {
                table.set(row, *index, FLAG_TRUE);
            }
        }
    }

    debug!(
        table = table.name(),
        column,
        flag_count = flags.len(),
        "pivoted list column"
    );
    flags.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(values: &[&str]) -> Table {
        let mut table = Table::with_columns("Boards_Features", &["BoardName", "device_has"]);
        for (position, value) in values.iter().enumerate() {
            let row = table.push_row();
            table.set(row, 0, format!("B{position}"));
            table.set(row, 1, *value);
        }
        table
    }

    #[test]
    fn distinct_tokens_become_flags() {
        let mut table = features(&["SERIAL,I2C", "null", "I2C, SPI"]);
        assert_eq!(pivot_column(&mut table, "device_has"), 3);
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["BoardName", "device_has", "SERIAL", "I2C", "SPI"]
        );
        assert_eq!(table.row(0)[2..], ["true", "true", "false"]);
        assert_eq!(table.row(1)[2..], ["false", "false", "false"]);
        assert_eq!(table.row(2)[2..], ["false", "true", "true"]);
    }

    #[test]
    fn missing_column_is_a_no_op() {
        let mut table = features(&["SERIAL"]);
        let before = table.clone();
        assert_eq!(pivot_column(&mut table, "macros"), 0);
        assert_eq!(table, before);
    }

    #[test]
    fn colliding_tokens_are_skipped() {
        let mut table = features(&["BoardName,SERIAL"]);
        assert_eq!(pivot_column(&mut table, "device_has"), 1);
        assert_eq!(table.cell(0, "BoardName"), Some("B0"));
        assert_eq!(table.cell(0, "SERIAL"), Some("true"));
    }
}
