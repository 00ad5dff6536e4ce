//! End-to-end tests for the analysis pipeline.

use std::collections::BTreeSet;
use std::fs;

use tja_cli::pipeline::{InputFormat, analyze, analyze_file, load_config};
use tja_ingest::{XmlCursor, load_json_str};
use tja_model::{AnalyzerConfig, AnalyzerError, SectionPivot, TableSet, split_list};
use tja_output::{OutputFormat, write_outputs};

const TWO_BOARDS: &str = r#"{
    "Target": { "device_has": ["SERIAL"], "public": "" },
    "Board1": { "inherits": ["Target"], "device_has_add": ["I2C"], "public": true }
}"#;

const TWO_BOARDS_XML: &str = "<RootObject>\
    <Target><device_has>SERIAL</device_has><public></public></Target>\
    <Board1><inherits>Target</inherits><device_has_add>I2C</device_has_add>\
    <public>true</public></Board1>\
    </RootObject>";

fn analyze_json(source: &str, config: &AnalyzerConfig) -> tja_model::Result<TableSet> {
    let tree = load_json_str(source, &config.root_element).expect("load json");
    analyze(&mut tree.cursor(), config)
}

fn assert_two_boards(tables: &TableSet) {
    let normalized = tables.get("Normalized_Boards").expect("normalized table");
    let board = normalized.find_row("BoardName", "Board1").expect("Board1 row");
    let device_has: BTreeSet<&str> = split_list(normalized.cell(board, "device_has").unwrap_or(""))
        .collect();
    assert_eq!(device_has, BTreeSet::from(["I2C", "SERIAL"]));

    let features = tables.get("Boards_Features").expect("feature matrix");
    let row = features.find_row("BoardName", "Board1").expect("Board1 features");
    assert_eq!(features.cell(row, "SERIAL"), Some("true"));
    assert_eq!(features.cell(row, "I2C"), Some("true"));
}

#[test]
fn json_document_produces_every_table() {
    let config = AnalyzerConfig::default();
    let tables = analyze_json(TWO_BOARDS, &config).expect("analyze");

    assert_eq!(
        tables.names(),
        vec![
            "Boards",
            "Config",
            "Overrides",
            "PostBinaryHook",
            "ExpectedSoftdevicesWithoffsets",
            "Progen",
            "TargetOverrides",
            "Normalized_Boards",
            "Boards_Features",
        ]
    );
    assert_two_boards(&tables);
}

#[test]
fn xml_document_matches_json() {
    let config = AnalyzerConfig::default();
    let from_json = analyze_json(TWO_BOARDS, &config).expect("analyze json");
    let from_xml = analyze(&mut XmlCursor::from_xml_str(TWO_BOARDS_XML), &config)
        .expect("analyze xml");

    assert_two_boards(&from_xml);
    for (json, xml) in from_json.iter().zip(from_xml.iter()) {
        assert_eq!(json.name(), xml.name());
        assert_eq!(
            json.column_names().collect::<Vec<_>>(),
            xml.column_names().collect::<Vec<_>>(),
            "columns of {}",
            json.name()
        );
    }
}

#[test]
fn missing_parent_yields_no_tables() {
    let config = AnalyzerConfig::default();
    let source = r#"{
        "Target": { "core": null },
        "Orphan": { "inherits": ["Nowhere"] }
    }"#;
    let error = analyze_json(source, &config).expect_err("missing parent");
    assert!(matches!(
        error,
        AnalyzerError::MissingParent { ref entity, ref parent }
            if entity == "Orphan" && parent == "Nowhere"
    ));
}

#[test]
fn identity_fields_in_the_document_are_rejected() {
    let config = AnalyzerConfig::default();
    let source = r#"{
        "Target": { "BoardName": "Oops", "device_has": ["X"] },
        "B": { "inherits": ["Target"] }
    }"#;
    let error = analyze_json(source, &config).expect_err("reserved field");
    assert!(matches!(error, AnalyzerError::MalformedDocument(_)));
}

#[test]
fn hidden_entities_stay_out_of_the_feature_matrix() {
    let config = AnalyzerConfig::default();
    let source = r#"{
        "Target": { "device_has": ["SERIAL"], "public": false },
        "Board1": { "inherits": ["Target"], "public": true }
    }"#;
    let tables = analyze_json(source, &config).expect("analyze");
    let features = tables.get("Boards_Features").expect("feature matrix");
    assert_eq!(features.row_count(), 1);
    assert_eq!(features.cell(0, "BoardName"), Some("Board1"));
    assert_eq!(features.cell(0, "SERIAL"), Some("true"));
}

#[test]
fn section_pivots_expand_section_columns() {
    let mut config = AnalyzerConfig::default();
    config.section_pivots.push(SectionPivot {
        table: "Config".to_string(),
        column: "value".to_string(),
    });
    let source = r#"{
        "Target": { "core": null },
        "MCU": {
            "inherits": ["Target"],
            "config": { "clock_sources": { "help": "Clocks", "value": ["HSE", "LSE"] } }
        }
    }"#;
    let tables = analyze_json(source, &config).expect("analyze");
    let settings = tables.get("Config").expect("config table");
    let row = settings.find_row("Name", "clock_sources").expect("config row");
    assert_eq!(settings.cell(row, "value"), Some("HSE,LSE"));
    assert_eq!(settings.cell(row, "HSE"), Some("true"));
    assert_eq!(settings.cell(row, "LSE"), Some("true"));
}

#[test]
fn analyze_file_detects_format_and_writes_outputs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("targets.xml");
    fs::write(&input, TWO_BOARDS_XML).expect("write input");

    let config = load_config(None).expect("default config");
    let format = InputFormat::detect(&input);
    assert_eq!(format, InputFormat::Xml);
    let tables = analyze_file(&input, format, &config).expect("analyze file");
    assert_two_boards(&tables);

    let out = dir.path().join("out");
    let written = write_outputs(&tables, &out, "targets", &[OutputFormat::Csv]).expect("write");
    assert_eq!(written.len(), tables.len());
    let boards_csv = fs::read_to_string(out.join("targets.Boards.csv")).expect("boards csv");
    insta::assert_snapshot!(boards_csv, @r"
    Inx;BoardName;device_has;public;inherits;device_has_add
    1;Target;SERIAL;;;
    2;Board1;;true;Target;I2C
    ");
}

#[test]
fn config_file_overrides_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("analyzer.json");
    fs::write(
        &path,
        r#"{ "base_entity": "Base", "sections": [], "pivot_columns": [] }"#,
    )
    .expect("write config");

    let config = load_config(Some(&path)).expect("load config");
    assert_eq!(config.base_entity, "Base");
    assert!(config.sections.is_empty());
    assert_eq!(config.root_element, AnalyzerConfig::default().root_element);
}

#[test]
fn unreadable_input_reports_the_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("absent.json");
    let error = analyze_file(&missing, InputFormat::Json, &AnalyzerConfig::default())
        .expect_err("missing input");
    assert!(format!("{error:#}").contains("absent.json"));
}
