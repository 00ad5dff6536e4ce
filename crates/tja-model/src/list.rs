//! Helpers for comma-joined list cells.

/// Marker written for empty source lists and elements with nested children.
///
/// During inheritance merging a `"null"` cell erases the running value.
pub const NULL_MARKER: &str = "null";

pub const LIST_SEPARATOR: char = ',';

/// Appends `value` to a comma-joined list, trimming leading separators.
///
/// ```
/// use tja_model::append_list_value;
///
/// assert_eq!(append_list_value("", "SERIAL"), "SERIAL");
/// assert_eq!(append_list_value("SERIAL", "I2C"), "SERIAL,I2C");
/// ```
pub fn append_list_value(current: &str, value: &str) -> String {
    let joined = format!("{current}{LIST_SEPARATOR}{value}");
    joined.trim_start_matches([LIST_SEPARATOR, ' ']).to_string()
}

/// Iterates the trimmed, non-empty tokens of a comma-joined list.
pub fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Removes every token listed in `removals` from `list`.
///
/// Matching is exact per token, so removing `I2C` keeps `I2C1`. Remaining
/// tokens keep their order and duplicates.
pub fn remove_list_items(list: &str, removals: &str) -> String {
    let removed: Vec<&str> = split_list(removals).collect();
    split_list(list)
        .filter(|token| !removed.contains(token))
        .collect::<Vec<_>>()
        .join(",")
}
