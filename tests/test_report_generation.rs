//! End-to-end report generation: schema text in, section list and documents out

use std::path::PathBuf;

use protodoc::config::ReportConfig;
use protodoc::report::{generate_cross_references, generate_spec_reference};
use protodoc::schema::{parse_file, ParseOptions};
use protodoc::{generate_header_section, parse, DocumentSection, ItemStyle, OutputFormat, TechnicalDocument};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn kinds(sections: &[DocumentSection]) -> Vec<&'static str> {
    sections.iter().map(|s| s.kind()).collect()
}

#[test]
fn test_section_order_with_all_optional_groups() {
    let header = parse_file(fixture("vc_state_machine.ksy"), ParseOptions::default()).unwrap();
    let sections = generate_header_section(&header);

    assert_eq!(
        kinds(&sections),
        vec![
            "section_header",
            "text",
            "code_block",
            "table",
            "table",
            "table",
            "table",
            "code_block",
            "item_list",
        ]
    );

    let titles: Vec<_> = sections.iter().filter_map(|s| s.title()).collect();
    assert_eq!(
        titles,
        vec![
            "VC Credit State Machine",
            "vc_state_machine Packet Layout",
            "vc_state_machine Field Definitions",
            "Vc State Values",
            "VC Credit State Machine States",
            "VC Credit State Machine Transitions",
            "VC Credit State Machine State Diagram",
            "Usage Notes",
        ]
    );
}

#[test]
fn test_cf_update_report() {
    let header = parse_file(fixture("cf_update.ksy"), ParseOptions::default()).unwrap();
    let sections = generate_header_section(&header);

    assert_eq!(
        kinds(&sections),
        vec!["section_header", "text", "code_block", "table", "table", "table", "item_list", "item_list"]
    );

    assert_eq!(
        sections[0],
        DocumentSection::SectionHeader {
            title: "CBFC CF_Update Control Ordered Set (CtlOS)".to_string(),
            subtitle: "8 bytes (64 bits)".to_string(),
        }
    );
    assert_eq!(
        sections[1],
        DocumentSection::Text {
            content: "Reference: UE Spec v1.0.1, Table 5-20, Table 5-21, Section 5.2.6.1, Page 492"
                .to_string(),
        }
    );

    match &sections[4] {
        DocumentSection::Table { title, rows, .. } => {
            assert_eq!(title, "Cbfc Message Type Values");
            assert_eq!(rows[0], vec!["0x00", "cf_update", "Credit update"]);
            assert_eq!(rows[1], vec!["0x01", "cf_init", ""]);
        }
        other => panic!("expected enum table, got {:?}", other),
    }

    assert_eq!(sections[5].title(), Some("Related Formats"));
    match &sections[7] {
        DocumentSection::ItemList { title, items, item_type } => {
            assert_eq!(title, "Validation Constraints");
            assert_eq!(items.len(), 3);
            assert_eq!(*item_type, ItemStyle::Closed);
        }
        other => panic!("expected item list, got {:?}", other),
    }
}

#[test]
fn test_field_table_columns() {
    let header = parse_file(fixture("cf_update.ksy"), ParseOptions::default()).unwrap();
    let sections = generate_header_section(&header);

    let DocumentSection::Table { title, headers, rows } = &sections[3] else {
        panic!("expected field table");
    };
    assert_eq!(title, "cbfc_cf_update Field Definitions");
    assert_eq!(headers, &vec!["Field", "Bits", "Offset", "Type", "Description", "Constraints"]);
    assert_eq!(
        rows[0],
        vec![
            "control_char",
            "8",
            "0",
            "u1",
            "Control character identifying a CtlOS.",
            "value == 0x5C",
        ]
    );
    assert_eq!(rows[3][0], "cf1_data");
    assert_eq!(rows[3][2], "16");
}

#[test]
fn test_packet_layout_block() {
    let header = parse_file(fixture("cf_update.ksy"), ParseOptions::default()).unwrap();
    let sections = generate_header_section(&header);

    let DocumentSection::CodeBlock { title, language, code } = &sections[2] else {
        panic!("expected code block");
    };
    assert_eq!(title, "cbfc_cf_update Packet Layout");
    assert_eq!(language, "");

    let lines: Vec<_> = code.lines().collect();
    assert_eq!(lines.len(), 7);
    assert!(lines[3].contains("control_char"));
    assert!(lines[5].contains("cf2_data"));
}

#[test]
fn test_spec_reference_and_cross_references() {
    let header = parse_file(fixture("vc_state_machine.ksy"), ParseOptions::default()).unwrap();
    assert_eq!(
        generate_spec_reference(&header).as_deref(),
        Some("UE Spec v1.0.1, Table 5-30, Section 5.2.7")
    );
    assert!(generate_cross_references(&header).is_empty());
}

#[test]
fn test_minimal_schema_has_no_optional_sections() {
    let header = parse("meta:\n  id: x\n  title: X\nseq:\n  - id: a\n    type: u1\n").unwrap();
    let sections = generate_header_section(&header);

    assert_eq!(kinds(&sections), vec!["section_header", "code_block", "table"]);
}

#[test]
fn test_build_document_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let schemas = dir.path().join("schemas");
    std::fs::create_dir_all(&schemas).unwrap();
    for name in ["cf_update.ksy", "vc_state_machine.ksy"] {
        std::fs::copy(fixture(name), schemas.join(name)).unwrap();
    }

    let config_path = dir.path().join("protodoc.yaml");
    std::fs::write(
        &config_path,
        r#"
document:
  title: Link Layer Reference
  subtitle: CBFC messages
schemas:
  directory: schemas
parse:
  require_id: true
  strict_sizes: true
  strict_state_machines: true
output: build/report.yaml
"#,
    )
    .unwrap();

    let config = ReportConfig::from_file(&config_path).unwrap();
    config.validate().unwrap();

    let document = config.build_document().unwrap();
    assert_eq!(
        document.outline(),
        vec!["CBFC CF_Update Control Ordered Set (CtlOS)", "VC Credit State Machine"]
    );
    assert_eq!(document.sections.len(), 8 + 9);

    let output = config.output_path();
    document.write_to(&output, OutputFormat::from_path(&output)).unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    let reloaded = TechnicalDocument::from_yaml(&written).unwrap();
    assert_eq!(reloaded, document);
    assert_eq!(reloaded.subtitle, "CBFC messages");
}

#[test]
fn test_build_document_reports_bad_schema() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.ksy"), "meta: [not, a, mapping]\n").unwrap();

    let config = ReportConfig::from_yaml(&format!(
        "schemas:\n  directory: {}\n",
        dir.path().display()
    ))
    .unwrap();

    let err = config.build_document().unwrap_err();
    assert!(err.to_string().contains("broken.ksy"));
}
