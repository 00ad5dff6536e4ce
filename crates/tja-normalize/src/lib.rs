//! Inheritance resolution and list pivoting over entity tables.

pub mod features;
pub mod pivot;
pub mod reconcile;
pub mod resolve;

pub use features::project_features;
pub use pivot::{FLAG_FALSE, FLAG_TRUE, pivot_column};
pub use reconcile::reconcile_add_remove;
pub use resolve::{MergePolicy, resolve_inheritance};

use tja_model::{AnalyzerConfig, Result, Table};

/// Resolves inheritance and reconciles `_add`/`_remove` companions,
/// producing `Normalized_Boards`.
///
/// Any missing parent or cycle fails the whole pass.
pub fn normalize_entities(boards: &Table, config: &AnalyzerConfig) -> Result<Table> {
    let mut normalized = resolve_inheritance(boards, config)?;
    reconcile_add_remove(&mut normalized);
    Ok(normalized)
}
