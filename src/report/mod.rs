//! Report assembly: turn a parsed header into an ordered section list.
//!
//! [`generate_header_section`] is the entry point. Each step is also exposed
//! on its own and yields nothing when its metadata is absent.

pub mod section;

pub use section::{DocumentSection, ItemStyle};

use crate::diagram::{PacketDiagram, DEFAULT_WIDTH_BITS};
use crate::enums::generate_enum_table;
use crate::schema::SchemaHeader;
use crate::state_machine::{
    extract_state_machine, generate_state_table, generate_transition_diagram,
    generate_transition_table,
};
use crate::utils::truncate_chars;

const DEFAULT_SPEC_VERSION: &str = "1.0.1";
const DESCRIPTION_WIDTH: usize = 50;
const CONSTRAINT_WIDTH: usize = 30;

/// Citation text from `x-spec`, e.g. "UE Spec v1.0.1, Table 5-20, Section 5.2.6.1, Page 492"
pub fn generate_spec_reference(header: &SchemaHeader) -> Option<String> {
    let spec = header.spec_reference.as_ref()?;

    let mut parts = vec![format!(
        "UE Spec v{}",
        spec.spec_version.as_deref().unwrap_or(DEFAULT_SPEC_VERSION)
    )];
    if let Some(table) = &spec.table {
        parts.push(table.clone());
    }
    if let Some(section) = &spec.section {
        parts.push(section.clone());
    }
    if let Some(page) = &spec.page {
        parts.push(format!("Page {}", page));
    }

    Some(parts.join(", "))
}

/// Packet layout diagram as a code block
pub fn generate_layout_section(header: &SchemaHeader, width_bits: usize) -> DocumentSection {
    DocumentSection::code_block(
        format!("{} Packet Layout", header.id),
        PacketDiagram::with_width(header, width_bits).render(),
    )
}

/// Field definition table
pub fn generate_field_table(header: &SchemaHeader) -> DocumentSection {
    let rows = header
        .fields
        .iter()
        .map(|field| {
            vec![
                field.name.clone(),
                field.size_bits.to_string(),
                field.offset_bits.to_string(),
                field.type_descriptor.clone(),
                truncate_chars(&field.description, DESCRIPTION_WIDTH),
                truncate_chars(
                    field.constraint_expression.as_deref().unwrap_or(""),
                    CONSTRAINT_WIDTH,
                ),
            ]
        })
        .collect();

    DocumentSection::Table {
        title: format!("{} Field Definitions", header.id),
        headers: ["Field", "Bits", "Offset", "Type", "Description", "Constraints"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        rows,
    }
}

pub fn generate_enum_section(header: &SchemaHeader) -> Vec<DocumentSection> {
    header
        .enums
        .iter()
        .map(|e| generate_enum_table(e, None))
        .collect()
}

/// State and transition tables plus the transition diagram, titled after the header
pub fn generate_state_machine_section(header: &SchemaHeader) -> Vec<DocumentSection> {
    let Some(sm) = extract_state_machine(header.protocol_metadata.as_ref()) else {
        return Vec::new();
    };
    let title = header.display_title();
    let mut sections = Vec::new();

    if !sm.states.is_empty() {
        let mut state_table = generate_state_table(&sm);
        state_table.set_title(format!("{} States", title));
        sections.push(state_table);
    }

    if !sm.transitions.is_empty() {
        let mut transition_table = generate_transition_table(&sm);
        transition_table.set_title(format!("{} Transitions", title));
        sections.push(transition_table);
    }

    let diagram = generate_transition_diagram(&sm);
    if !diagram.is_empty() {
        sections.push(DocumentSection::code_block(
            format!("{} State Diagram", title),
            diagram,
        ));
    }

    sections
}

/// "Related Formats" table from `x-protocol.related_messages`
pub fn generate_cross_references(header: &SchemaHeader) -> Vec<DocumentSection> {
    let related = match &header.protocol_metadata {
        Some(protocol) if !protocol.related_messages.is_empty() => &protocol.related_messages,
        _ => return Vec::new(),
    };

    vec![DocumentSection::Table {
        title: "Related Formats".to_string(),
        headers: vec![
            "Format".to_string(),
            "Description".to_string(),
            "Reference".to_string(),
        ],
        rows: related
            .iter()
            .map(|m| vec![m.name.clone(), m.description.clone(), m.reference.clone()])
            .collect(),
    }]
}

pub fn generate_usage_notes(header: &SchemaHeader) -> Vec<DocumentSection> {
    match &header.protocol_metadata {
        Some(protocol) if !protocol.usage_notes.is_empty() => vec![DocumentSection::closed_list(
            "Usage Notes",
            protocol.usage_notes.clone(),
        )],
        _ => Vec::new(),
    }
}

pub fn generate_constraints_section(header: &SchemaHeader) -> Vec<DocumentSection> {
    match &header.packet_metadata {
        Some(packet) if !packet.constraints.is_empty() => vec![DocumentSection::closed_list(
            "Validation Constraints",
            packet.constraints.clone(),
        )],
        _ => Vec::new(),
    }
}

/// Every section for one header, in report order:
///
/// 1. section header with size
/// 2. spec reference text
/// 3. packet layout diagram
/// 4. field definition table
/// 5. enum value tables
/// 6. state machine tables and diagram
/// 7. related formats
/// 8. usage notes
/// 9. validation constraints
pub fn generate_header_section(header: &SchemaHeader) -> Vec<DocumentSection> {
    generate_header_section_with_width(header, DEFAULT_WIDTH_BITS)
}

/// [`generate_header_section`] with a custom packet diagram width
pub fn generate_header_section_with_width(
    header: &SchemaHeader,
    width_bits: usize,
) -> Vec<DocumentSection> {
    let mut sections = vec![DocumentSection::SectionHeader {
        title: header.display_title().to_string(),
        subtitle: format!(
            "{} bytes ({} bits)",
            header.size_bytes,
            u128::from(header.size_bytes) * 8
        ),
    }];

    if let Some(reference) = generate_spec_reference(header) {
        sections.push(DocumentSection::Text {
            content: format!("Reference: {}", reference),
        });
    }

    sections.push(generate_layout_section(header, width_bits));
    sections.push(generate_field_table(header));
    sections.extend(generate_enum_section(header));
    sections.extend(generate_state_machine_section(header));
    sections.extend(generate_cross_references(header));
    sections.extend(generate_usage_notes(header));
    sections.extend(generate_constraints_section(header));

    tracing::debug!("Generated {} sections for {}", sections.len(), header.id);
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse;

    #[test]
    fn test_minimal_header_yields_three_sections() {
        let header = parse("meta:\n  id: x\n  title: X\nseq:\n  - id: a\n    type: u1\n").unwrap();
        let sections = generate_header_section(&header);

        let kinds: Vec<_> = sections.iter().map(|s| s.kind()).collect();
        assert_eq!(kinds, vec!["section_header", "code_block", "table"]);

        assert_eq!(
            sections[0],
            DocumentSection::SectionHeader {
                title: "X".to_string(),
                subtitle: "1 bytes (8 bits)".to_string(),
            }
        );
        assert_eq!(sections[1].title(), Some("x Packet Layout"));
        assert_eq!(sections[2].title(), Some("x Field Definitions"));
    }

    #[test]
    fn test_spec_reference_defaults_version_and_skips_missing_parts() {
        let header = parse("meta:\n  id: x\nx-spec:\n  page: 12\nseq: []\n").unwrap();
        assert_eq!(
            generate_spec_reference(&header).as_deref(),
            Some("UE Spec v1.0.1, Page 12")
        );

        let header = parse("meta:\n  id: x\nseq: []\n").unwrap();
        assert!(generate_spec_reference(&header).is_none());
    }

    #[test]
    fn test_field_table_truncates_description_and_constraint() {
        let description = "d".repeat(80);
        let constraint = "c".repeat(40);
        let yaml = format!(
            "meta:\n  id: x\nseq:\n  - id: a\n    type: u2\n    doc: {}\n    x-constraint: {}\n",
            description, constraint
        );
        let header = parse(&yaml).unwrap();

        let DocumentSection::Table { headers, rows, .. } = generate_field_table(&header) else {
            panic!("expected table");
        };
        assert_eq!(headers[5], "Constraints");
        assert_eq!(rows[0][1], "16");
        assert_eq!(rows[0][2], "0");
        assert_eq!(rows[0][4].chars().count(), 50);
        assert_eq!(rows[0][5].chars().count(), 30);
    }

    #[test]
    fn test_state_machine_without_transitions_skips_transition_table() {
        let yaml = r#"
meta:
  id: sm
  title: Link
seq: []
x-protocol:
  state_machine:
    initial_state: UP
    states:
      - name: UP
        description: Link up
"#;
        let header = parse(yaml).unwrap();
        let titles: Vec<_> = generate_state_machine_section(&header)
            .iter()
            .filter_map(|s| s.title().map(str::to_string))
            .collect();
        assert_eq!(titles, vec!["Link States", "Link State Diagram"]);
    }

    #[test]
    fn test_empty_state_machine_block_emits_nothing() {
        let header =
            parse("meta: {id: x, title: X}\nseq: [{id: a, type: u1}]\nx-protocol:\n  state_machine: {}\n")
                .unwrap();

        assert!(generate_state_machine_section(&header).is_empty());
        let kinds: Vec<_> = generate_header_section(&header).iter().map(|s| s.kind()).collect();
        assert_eq!(kinds, vec!["section_header", "code_block", "table"]);
    }

    #[test]
    fn test_state_machine_without_states_skips_state_table() {
        let yaml = "meta: {id: sm, title: Link}\nseq: []\nx-protocol:\n  state_machine:\n    transitions:\n      - {from: A, to: B, trigger: go}\n";
        let header = parse(yaml).unwrap();

        let titles: Vec<_> = generate_state_machine_section(&header)
            .iter()
            .filter_map(|s| s.title().map(str::to_string))
            .collect();
        assert_eq!(titles, vec!["Link Transitions"]);
    }

    #[test]
    fn test_subtitle_for_largest_size() {
        let yaml = format!("meta: {{id: x}}\nx-packet: {{size_bytes: {}}}\nseq: []\n", u64::MAX / 8);
        let header = parse(&yaml).unwrap();

        let sections = generate_header_section(&header);
        assert_eq!(
            sections[0],
            DocumentSection::SectionHeader {
                title: "x".to_string(),
                subtitle: "2305843009213693951 bytes (18446744073709551608 bits)".to_string(),
            }
        );
    }

    #[test]
    fn test_related_messages_render_missing_fields_empty() {
        let yaml = "meta:\n  id: x\nseq: []\nx-protocol:\n  related_messages:\n    - name: CF_Init\n";
        let header = parse(yaml).unwrap();

        let sections = generate_cross_references(&header);
        let DocumentSection::Table { title, rows, .. } = &sections[0] else {
            panic!("expected table");
        };
        assert_eq!(title, "Related Formats");
        assert_eq!(rows[0], vec!["CF_Init", "", ""]);
    }

    #[test]
    fn test_empty_optional_lists_emit_nothing() {
        let yaml = "meta:\n  id: x\nseq: []\nx-packet:\n  constraints: []\nx-protocol:\n  usage_notes: []\n";
        let header = parse(yaml).unwrap();

        assert!(generate_usage_notes(&header).is_empty());
        assert!(generate_constraints_section(&header).is_empty());
        assert_eq!(generate_header_section(&header).len(), 3);
    }
}
