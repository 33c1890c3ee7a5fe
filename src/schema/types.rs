//! Type definitions for parsed protocol schemas.
//!
//! [`SchemaHeader`] and [`Field`] are the normalized model produced by the
//! parser. The metadata namespaces (`x-spec`, `x-packet`, `x-protocol`) are
//! deserialized straight from YAML into the structs below; keys this crate
//! does not interpret are kept in each struct's `extra` map.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::enums::EnumDef;
use crate::utils::scalar_to_string;

/// One parsed protocol message definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaHeader {
    pub id: String,
    pub title: String,
    /// Explicit `x-packet.size_bytes`, or the field bit total rounded up to whole bytes
    pub size_bytes: u64,
    pub fields: Vec<Field>,
    pub doc: String,
    pub spec_reference: Option<SpecReference>,
    pub packet_metadata: Option<PacketMetadata>,
    pub protocol_metadata: Option<ProtocolMetadata>,
    /// Normalized `enums` namespace, in declaration order. Empty when absent.
    pub enums: Vec<EnumDef>,
    pub instances: Option<Vec<Instance>>,
}

impl SchemaHeader {
    /// Title for headings, falling back to the id
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.id
        } else {
            &self.title
        }
    }

    /// Sum of all field widths
    pub fn total_bits(&self) -> u64 {
        self.fields.iter().map(|f| f.size_bits).sum()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One element of the `seq` list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub type_descriptor: String,
    pub size_bits: u64,
    /// Running total of the preceding fields' sizes
    pub offset_bits: u64,
    /// First line of `doc`
    pub description: String,
    pub(crate) doc: String,
    pub required: Option<bool>,
    pub constraint_expression: Option<String>,
    pub spec_reference_note: Option<String>,
    pub enum_name: Option<String>,
}

impl Field {
    /// The complete doc text, trimmed but with all lines
    pub fn full_doc(&self) -> &str {
        &self.doc
    }
}

/// A computed value from the `instances` namespace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    pub name: String,
    pub value: String,
    pub description: String,
}

/// `x-spec`: citation back to the external specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecReference {
    #[serde(default, alias = "version", deserialize_with = "scalar_opt")]
    pub spec_version: Option<String>,
    #[serde(default, deserialize_with = "scalar_opt")]
    pub table: Option<String>,
    #[serde(default, deserialize_with = "scalar_opt")]
    pub section: Option<String>,
    #[serde(default, deserialize_with = "scalar_opt")]
    pub page: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// `x-packet`: packet placement and validation constraints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PacketMetadata {
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default, deserialize_with = "scalar_opt")]
    pub layer: Option<String>,
    #[serde(default, deserialize_with = "scalar_opt")]
    pub sublayer: Option<String>,
    #[serde(default, deserialize_with = "scalar_list")]
    pub constraints: Vec<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// `x-protocol`: behavioural description of the message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProtocolMetadata {
    #[serde(default, deserialize_with = "scalar_opt")]
    pub description: Option<String>,
    #[serde(default)]
    pub state_machine: Option<StateMachineSpec>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub related_messages: Vec<RelatedMessage>,
    #[serde(default, deserialize_with = "scalar_list")]
    pub usage_notes: Vec<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Cross-reference to another message format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelatedMessage {
    #[serde(default, deserialize_with = "scalar_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar_or_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "scalar_or_empty")]
    pub reference: String,
}

/// Raw `x-protocol.state_machine` block as written in the schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateMachineSpec {
    #[serde(default, deserialize_with = "scalar_or_empty")]
    pub initial_state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub states: Vec<StateSpec>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transitions: Vec<TransitionSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSpec {
    #[serde(default, deserialize_with = "scalar_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar_or_empty")]
    pub description: String,
    #[serde(default)]
    pub is_terminal: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionSpec {
    #[serde(default, rename = "from", deserialize_with = "scalar_or_empty")]
    pub from_state: String,
    #[serde(default, rename = "to", deserialize_with = "scalar_or_empty")]
    pub to_state: String,
    #[serde(default, deserialize_with = "scalar_or_empty")]
    pub trigger: String,
    #[serde(default, deserialize_with = "scalar_opt")]
    pub condition: Option<String>,
    #[serde(default, deserialize_with = "scalar_opt")]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "scalar_opt")]
    pub spec_ref: Option<String>,
}

// Schemas are hand-written, so `page: 492` and `page: "492"` must both work.
fn scalar_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => scalar_to_string(&v)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("expected a scalar value")),
    }
}

fn scalar_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_opt(deserializer)?.unwrap_or_default())
}

fn scalar_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    values
        .iter()
        .map(|v| scalar_to_string(v).ok_or_else(|| serde::de::Error::custom("expected a list of scalars")))
        .collect()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_reference_accepts_numeric_page_and_version_alias() {
        let spec: SpecReference = serde_yaml::from_str(
            "version: 2.0\ntable: Table 3-1\npage: 17\nrevision: B\n",
        )
        .unwrap();

        assert_eq!(spec.spec_version.as_deref(), Some("2.0"));
        assert_eq!(spec.table.as_deref(), Some("Table 3-1"));
        assert_eq!(spec.page.as_deref(), Some("17"));
        assert!(spec.section.is_none());
        assert_eq!(spec.extra.get("revision"), Some(&Value::from("B")));
    }

    #[test]
    fn test_protocol_metadata_null_lists() {
        let proto: ProtocolMetadata =
            serde_yaml::from_str("description: Flow control\nusage_notes:\nrelated_messages:\n").unwrap();

        assert_eq!(proto.description.as_deref(), Some("Flow control"));
        assert!(proto.usage_notes.is_empty());
        assert!(proto.related_messages.is_empty());
        assert!(proto.state_machine.is_none());
    }

    #[test]
    fn test_transition_spec_renames() {
        let t: TransitionSpec =
            serde_yaml::from_str("from: IDLE\nto: ACTIVE\ntrigger: credit_received\n").unwrap();

        assert_eq!(t.from_state, "IDLE");
        assert_eq!(t.to_state, "ACTIVE");
        assert!(t.condition.is_none());
    }

    #[test]
    fn test_display_title_falls_back_to_id() {
        let header = SchemaHeader {
            id: "x".to_string(),
            title: String::new(),
            size_bytes: 0,
            fields: vec![],
            doc: String::new(),
            spec_reference: None,
            packet_metadata: None,
            protocol_metadata: None,
            enums: vec![],
            instances: None,
        };
        assert_eq!(header.display_title(), "x");
    }
}
