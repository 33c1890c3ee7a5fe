//! Renderer-agnostic document sections.
//!
//! Serialized with a `type` tag so a section list reads the same way as the
//! hand-written YAML data files the document renderers accept:
//!
//! ```yaml
//! - type: table
//!   title: cf_update Field Definitions
//!   headers: [Field, Bits, Offset, Type, Description, Constraints]
//!   rows:
//!     - [control_char, "8", "0", u1, Control character, value == 0x5C]
//! ```

use serde::{Deserialize, Serialize};

/// Bullet style for item lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStyle {
    Open,
    Closed,
}

/// One block of output content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentSection {
    SectionHeader {
        title: String,
        subtitle: String,
    },
    Text {
        content: String,
    },
    Table {
        title: String,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    CodeBlock {
        title: String,
        #[serde(default)]
        language: String,
        code: String,
    },
    ItemList {
        title: String,
        items: Vec<String>,
        item_type: ItemStyle,
    },
}

impl DocumentSection {
    /// Code block without a language tag
    pub fn code_block(title: impl Into<String>, code: impl Into<String>) -> Self {
        DocumentSection::CodeBlock {
            title: title.into(),
            language: String::new(),
            code: code.into(),
        }
    }

    pub fn closed_list(title: impl Into<String>, items: Vec<String>) -> Self {
        DocumentSection::ItemList {
            title: title.into(),
            items,
            item_type: ItemStyle::Closed,
        }
    }

    /// The serialized `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentSection::SectionHeader { .. } => "section_header",
            DocumentSection::Text { .. } => "text",
            DocumentSection::Table { .. } => "table",
            DocumentSection::CodeBlock { .. } => "code_block",
            DocumentSection::ItemList { .. } => "item_list",
        }
    }

    /// Title of the section; text sections have none
    pub fn title(&self) -> Option<&str> {
        match self {
            DocumentSection::SectionHeader { title, .. }
            | DocumentSection::Table { title, .. }
            | DocumentSection::CodeBlock { title, .. }
            | DocumentSection::ItemList { title, .. } => Some(title.as_str()),
            DocumentSection::Text { .. } => None,
        }
    }

    /// Replace the title. No-op on text sections.
    pub(crate) fn set_title(&mut self, new_title: String) {
        match self {
            DocumentSection::SectionHeader { title, .. }
            | DocumentSection::Table { title, .. }
            | DocumentSection::CodeBlock { title, .. }
            | DocumentSection::ItemList { title, .. } => *title = new_title,
            DocumentSection::Text { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_type_tag() {
        let section = DocumentSection::closed_list("Usage Notes", vec!["Send every 1us".to_string()]);
        let yaml = serde_yaml::to_string(&section).unwrap();

        assert!(yaml.contains("type: item_list"));
        assert!(yaml.contains("item_type: closed"));
        assert!(yaml.contains("title: Usage Notes"));
    }

    #[test]
    fn test_round_trips_through_json() {
        let section = DocumentSection::code_block("x Packet Layout", "+-+");
        let json = serde_json::to_string(&section).unwrap();
        assert!(json.contains(r#""type":"code_block""#));

        let back: DocumentSection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, section);
        assert_eq!(back.kind(), "code_block");
    }

    #[test]
    fn test_title_accessors() {
        let mut table = DocumentSection::Table {
            title: "Old".to_string(),
            headers: vec![],
            rows: vec![],
        };
        table.set_title("New".to_string());
        assert_eq!(table.title(), Some("New"));

        let text = DocumentSection::Text { content: "Reference".to_string() };
        assert_eq!(text.title(), None);
    }
}
