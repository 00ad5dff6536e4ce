pub mod config;
pub mod error;
pub mod list;
pub mod table;

pub use config::{
    ADD_SUFFIX, AnalyzerConfig, BOARDS_TABLE, FEATURES_TABLE, INDEX_COLUMN, NAME_COLUMN,
    NORMALIZED_TABLE, REMOVE_SUFFIX, SECTION_NAME_COLUMN, SECTION_VALUE_COLUMN, SectionKind,
    SectionPivot, SectionSpec, companion_base,
};
pub use error::{AnalyzerError, Result};
pub use list::{LIST_SEPARATOR, NULL_MARKER, append_list_value, remove_list_items, split_list};
pub use table::{Column, Table, TableSet};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_registers_all_sections() {
        let config = AnalyzerConfig::default();
        let tables: Vec<&str> = config.sections.iter().map(|s| s.table.as_str()).collect();
        assert_eq!(
            tables,
            vec![
                "Config",
                "Overrides",
                "PostBinaryHook",
                "ExpectedSoftdevicesWithoffsets",
                "Progen",
                "TargetOverrides",
            ]
        );
        assert!(config.is_list_column("macros_add"));
        assert!(config.is_list_column("extra_labels"));
        assert!(!config.is_list_column("core"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: AnalyzerConfig =
            serde_json::from_str(r#"{ "feature_column": "features" }"#).expect("parse config");
        assert_eq!(config.feature_column, "features");
        assert_eq!(config.root_element, "RootObject");
        assert_eq!(config.sections.len(), 6);
    }

    #[test]
    fn section_kind_uses_snake_case() {
        let spec: SectionSpec =
            serde_json::from_str(r#"{ "element": "x", "table": "X", "kind": "structured" }"#)
                .expect("parse section");
        assert_eq!(spec.kind, SectionKind::Structured);
    }

    #[test]
    fn missing_parent_message_names_both_entities() {
        let error = AnalyzerError::MissingParent {
            entity: "X".to_string(),
            parent: "Y".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "entity 'X' inherits from 'Y', which is not declared"
        );
    }
}
