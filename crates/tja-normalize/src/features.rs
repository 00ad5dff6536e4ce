use tracing::debug;

use tja_model::{AnalyzerConfig, AnalyzerError, FEATURES_TABLE, NAME_COLUMN, Result, Table};

use crate::pivot::{FLAG_FALSE, pivot_column};

/// Builds the feature matrix: `BoardName` plus one flag column per item of
/// the feature list, for every entity whose `public` is not `"false"`.
pub fn project_features(normalized: &Table, config: &AnalyzerConfig) -> Result<Table> {
    let name = normalized
        .column_index(NAME_COLUMN)
        .ok_or_else(|| AnalyzerError::MissingColumn {
            table: normalized.name().to_string(),
            column: NAME_COLUMN.to_string(),
        })?;
    let public = normalized.column_index(&config.public_column);
    let feature = normalized.column_index(&config.feature_column);

    let mut matrix = Table::with_columns(
        FEATURES_TABLE,
        &[NAME_COLUMN, config.feature_column.as_str()],
    );
    let mut hidden = 0usize;
    for row in 0..normalized.row_count() {
        if public.is_some_and(|column| normalized.value(row, column) == FLAG_FALSE) {
            hidden += 1;
            continue;
        }
        let target = matrix.push_row();
        matrix.set(target, 0, normalized.value(row, name));
        if let Some(column) = feature {
            matrix.set(target, 1, normalized.value(row, column));
        }
    }

    pivot_column(&mut matrix, &config.feature_column);
    matrix.remove_column(&config.feature_column);
    debug!(
        entity_count = matrix.row_count(),
        hidden_count = hidden,
        feature_count = matrix.column_count() - 1,
        "projected feature matrix"
    );
    Ok(matrix)
}
