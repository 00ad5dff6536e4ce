//! Analysis pipeline: load → map → normalize → pivot → project.

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span};

use tja_ingest::{TreeCursor, XmlCursor, load_json_file};
use tja_map::map_document;
use tja_model::{AnalyzerConfig, TableSet};
use tja_normalize::{normalize_entities, pivot_column, project_features};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Xml,
}

impl InputFormat {
    /// `.xml` files are read as XML, everything else as JSON.
    pub fn detect(path: &Path) -> Self {
        let is_xml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        if is_xml { Self::Xml } else { Self::Json }
    }
}

/// Runs every stage over a document and returns the finished table set.
///
/// Tables come out as `Boards`, the section tables in registry order,
/// `Normalized_Boards` and `Boards_Features`. Any error aborts the run
/// without a partial table set.
pub fn analyze(cursor: &mut dyn TreeCursor, config: &AnalyzerConfig) -> tja_model::Result<TableSet> {
    let mapped = info_span!("map").in_scope(|| -> tja_model::Result<_> {
        let start = Instant::now();
        let mapped = map_document(cursor, config)?;
        info!(
            entity_count = mapped.boards.row_count(),
            column_count = mapped.boards.column_count(),
            section_count = mapped.sections.len(),
            duration_ms = start.elapsed().as_millis(),
            "mapping complete"
        );
        Ok(mapped)
    })?;

    let normalized = info_span!("normalize").in_scope(|| -> tja_model::Result<_> {
        let start = Instant::now();
        let mut normalized = normalize_entities(&mapped.boards, config)?;
        let mut flag_count = 0;
        for column in &config.pivot_columns {
            flag_count += pivot_column(&mut normalized, column);
        }
        info!(
            entity_count = normalized.row_count(),
            column_count = normalized.column_count(),
            flag_count,
            duration_ms = start.elapsed().as_millis(),
            "normalization complete"
        );
        Ok(normalized)
    })?;

    let features = info_span!("features").in_scope(|| -> tja_model::Result<_> {
        let start = Instant::now();
        let features = project_features(&normalized, config)?;
        info!(
            entity_count = features.row_count(),
            feature_count = features.column_count().saturating_sub(1),
            duration_ms = start.elapsed().as_millis(),
            "feature projection complete"
        );
        Ok(features)
    })?;

    let mut tables = TableSet::new();
    tables.insert(mapped.boards);
    for section in mapped.sections {
        tables.insert(section);
    }
    for pivot in &config.section_pivots {
        match tables.get_mut(&pivot.table) {
            Some(table) => {
                pivot_column(table, &pivot.column);
            }
            None => debug!(table = %pivot.table, "section pivot names an unknown table"),
        }
    }
    tables.insert(normalized);
    tables.insert(features);
    Ok(tables)
}

/// Loads `path` in the given format and analyzes it.
pub fn analyze_file(path: &Path, format: InputFormat, config: &AnalyzerConfig) -> Result<TableSet> {
    let tables = match format {
        InputFormat::Json => {
            let tree = load_json_file(path, &config.root_element)
                .with_context(|| format!("load {}", path.display()))?;
            analyze(&mut tree.cursor(), config)
        }
        InputFormat::Xml => {
            let mut cursor =
                XmlCursor::from_path(path).with_context(|| format!("open {}", path.display()))?;
            analyze(&mut cursor, config)
        }
    };
    tables.with_context(|| format!("analyze {}", path.display()))
}

/// Reads an analyzer configuration file, or the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig> {
    let Some(path) = path else {
        return Ok(AnalyzerConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let config: AnalyzerConfig =
        serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
    debug!(path = %path.display(), section_count = config.sections.len(), "loaded configuration");
    Ok(config)
}
