//! Analyzer configuration.
//!
//! Built once at startup and passed by reference through every stage. All
//! fields default to the conventions of the mbed `targets.json` file.

use serde::{Deserialize, Serialize};

/// Row identity column of the entity tables (1-based declaration order).
pub const INDEX_COLUMN: &str = "Inx";
/// Entity name column, also the owner column of extended section tables.
pub const NAME_COLUMN: &str = "BoardName";
/// Item name column of extended section tables.
pub const SECTION_NAME_COLUMN: &str = "Name";
/// Item text column of extended section tables.
pub const SECTION_VALUE_COLUMN: &str = "Value";

pub const BOARDS_TABLE: &str = "Boards";
pub const NORMALIZED_TABLE: &str = "Normalized_Boards";
pub const FEATURES_TABLE: &str = "Boards_Features";

/// Suffix of list columns holding items to append after merging.
pub const ADD_SUFFIX: &str = "_add";
/// Suffix of list columns holding items to strip after merging.
pub const REMOVE_SUFFIX: &str = "_remove";

/// How an extended section's subtree is laid out as rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// One `(BoardName, Name, Value)` row per item.
    #[default]
    KeyValue,
    /// One `(BoardName, Name)` row per item, nested children become columns.
    Structured,
}

/// An element name whose subtree is mapped into its own table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub element: String,
    pub table: String,
    #[serde(default)]
    pub kind: SectionKind,
}

impl SectionSpec {
    pub fn new(element: &str, table: &str, kind: SectionKind) -> Self {
        Self {
            element: element.to_string(),
            table: table.to_string(),
            kind,
        }
    }
}

/// A list column of an extended section table to pivot into flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPivot {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Name of the document's root element.
    pub root_element: String,
    /// First entity of the document; earlier root children are skipped.
    pub base_entity: String,
    /// Extended sections in output order.
    pub sections: Vec<SectionSpec>,
    /// Columns merged by concatenation across the ancestor chain.
    pub list_columns: Vec<String>,
    /// Normalized columns expanded into boolean flag columns.
    pub pivot_columns: Vec<String>,
    /// List column kept (and pivoted) in the feature matrix.
    pub feature_column: String,
    pub public_column: String,
    pub inherits_column: String,
    /// Section table columns pivoted after mapping, none by default.
    pub section_pivots: Vec<SectionPivot>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        let families = ["device_has", "macros", "features", "extra_labels"];
        Self {
            root_element: "RootObject".to_string(),
            base_entity: "Target".to_string(),
            sections: vec![
                SectionSpec::new("config", "Config", SectionKind::Structured),
                SectionSpec::new("overrides", "Overrides", SectionKind::KeyValue),
                SectionSpec::new(
                    "post_binary_hook",
                    "PostBinaryHook",
                    SectionKind::Structured,
                ),
                SectionSpec::new(
                    "EXPECTED_SOFTDEVICES_WITH_OFFSETS",
                    "ExpectedSoftdevicesWithoffsets",
                    SectionKind::KeyValue,
                ),
                SectionSpec::new("progen", "Progen", SectionKind::KeyValue),
                SectionSpec::new(
                    "target_overrides",
                    "TargetOverrides",
                    SectionKind::Structured,
                ),
            ],
            list_columns: families.iter().map(ToString::to_string).collect(),
            pivot_columns: families.iter().map(ToString::to_string).collect(),
            feature_column: "device_has".to_string(),
            public_column: "public".to_string(),
            inherits_column: "inherits".to_string(),
            section_pivots: Vec::new(),
        }
    }
}

impl AnalyzerConfig {
    pub fn section(&self, element: &str) -> Option<&SectionSpec> {
        self.sections.iter().find(|spec| spec.element == element)
    }

    /// True for configured list columns and for every `_add`/`_remove` companion.
    pub fn is_list_column(&self, column: &str) -> bool {
        self.list_columns.iter().any(|name| name == column) || companion_base(column).is_some()
    }
}

/// Splits a companion column name into its base column and suffix.
///
/// ```
/// use tja_model::companion_base;
///
/// assert_eq!(companion_base("device_has_add"), Some(("device_has", "_add")));
/// assert_eq!(companion_base("device_has"), None);
/// ```
pub fn companion_base(column: &str) -> Option<(&str, &'static str)> {
    for suffix in [ADD_SUFFIX, REMOVE_SUFFIX] {
        if let Some(base) = column.strip_suffix(suffix)
            && !base.is_empty()
        {
            return Some((base, suffix));
        }
    }
    None
}
