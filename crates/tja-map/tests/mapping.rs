use tja_ingest::{XmlCursor, load_json_str};
use tja_map::{KeyValueReader, SectionRegistry, map_document, map_document_with};
use tja_model::{AnalyzerConfig, Table};

const TARGETS: &str = r#"{
    "Target": {
        "core": null,
        "public": false,
        "device_has": [],
        "config": {
            "stdio_baud": { "help": "Baud rate", "value": 9600 }
        }
    },
    "MCU_NRF51": {
        "inherits": ["Target"],
        "core": "Cortex-M0",
        "device_has": ["SERIAL", "I2C"],
        "post_binary_hook": {
            "function": "MCU_NRF51Code.binary_hook",
            "toolchains": ["ARM_STD", "GCC_ARM"]
        },
        "overrides": { "lf_clock_src": "NRF_LF_SRC_XTAL" }
    },
    "NRF51_DK": {
        "inherits": ["MCU_NRF51"],
        "device_has_remove": ["I2C"],
        "release_versions": ["2", "5"]
    }
}"#;

fn section<'a>(sections: &'a [Table], name: &str) -> &'a Table {
    sections
        .iter()
        .find(|table| table.name() == name)
        .unwrap_or_else(|| panic!("missing section table {name}"))
}

#[test]
fn json_document_maps_entities_and_sections() {
    let config = AnalyzerConfig::default();
    let tree = load_json_str(TARGETS, &config.root_element).expect("load json");
    let mapped = map_document(&mut tree.cursor(), &config).expect("map document");

    let boards = &mapped.boards;
    assert_eq!(boards.row_count(), 3);
    assert_eq!(
        boards.column_names().collect::<Vec<_>>(),
        vec![
            "Inx",
            "BoardName",
            "core",
            "public",
            "device_has",
            "inherits",
            "device_has_remove",
            "release_versions",
        ]
    );
    assert_eq!(boards.cell(0, "core"), Some("null"));
    assert_eq!(boards.cell(0, "device_has"), Some("null"));
    assert_eq!(boards.cell(1, "device_has"), Some("SERIAL,I2C"));
    assert_eq!(boards.cell(2, "release_versions"), Some("2,5"));
    assert_eq!(boards.cell(2, "core"), Some(""));

    let names: Vec<&str> = mapped.sections.iter().map(Table::name).collect();
    assert_eq!(
        names,
        vec![
            "Config",
            "Overrides",
            "PostBinaryHook",
            "ExpectedSoftdevicesWithoffsets",
            "Progen",
            "TargetOverrides",
        ]
    );

    let config_table = section(&mapped.sections, "Config");
    assert_eq!(config_table.cell(0, "BoardName"), Some("Target"));
    assert_eq!(config_table.cell(0, "Name"), Some("stdio_baud"));
    assert_eq!(config_table.cell(0, "value"), Some("9600"));

    let hook = section(&mapped.sections, "PostBinaryHook");
    assert_eq!(hook.row_count(), 2);
    assert_eq!(hook.cell(1, "Value"), Some("ARM_STD,GCC_ARM"));

    let overrides = section(&mapped.sections, "Overrides");
    assert_eq!(overrides.cell(0, "BoardName"), Some("MCU_NRF51"));
    assert!(section(&mapped.sections, "Progen").is_empty());
}

#[test]
fn xml_and_json_sources_map_identically() {
    let config = AnalyzerConfig::default();
    let tree = load_json_str(
        r#"{ "Target": { "core": "M0", "macros": ["A", "B"] }, "Board1": { "inherits": ["Target"] } }"#,
        &config.root_element,
    )
    .expect("load json");
    let from_json = map_document(&mut tree.cursor(), &config).expect("map json");

    let mut cursor = XmlCursor::from_xml_str(
        "<RootObject>\
           <Target><core>M0</core><macros>A</macros><macros>B</macros></Target>\
           <Board1><inherits>Target</inherits></Board1>\
         </RootObject>",
    );
    let from_xml = map_document(&mut cursor, &config).expect("map xml");

    assert_eq!(from_json.boards, from_xml.boards);
    assert_eq!(from_json.sections, from_xml.sections);
}

#[test]
fn custom_registry_adds_sections() {
    let config = AnalyzerConfig::default();
    let mut registry = SectionRegistry::new();
    registry.register("bootloader_supported", "Bootloader", KeyValueReader::boxed);

    let mut cursor = XmlCursor::from_xml_str(
        "<RootObject><Target><bootloader_supported>true</bootloader_supported>\
         <config><x>1</x></config></Target></RootObject>",
    );
    let mapped = map_document_with(&mut cursor, &config, &registry).expect("map document");

    assert_eq!(mapped.sections.len(), 1);
    let bootloader = &mapped.sections[0];
    assert_eq!(bootloader.cell(0, "Name"), Some("bootloader_supported"));
    assert_eq!(bootloader.cell(0, "Value"), Some("true"));
    // Without a registered reader, `config` is an ordinary nested field.
    assert_eq!(mapped.boards.cell(0, "config"), Some("null"));
    assert_eq!(mapped.boards.cell(0, "x"), Some("1"));
}

#[test]
fn mismatched_end_tags_are_rejected() {
    let mut cursor = XmlCursor::from_xml_str("<RootObject><Target><core>x</Target></core></RootObject>");
    let error = map_document(&mut cursor, &AnalyzerConfig::default()).unwrap_err();
    assert!(error.to_string().starts_with("malformed document"));
}
