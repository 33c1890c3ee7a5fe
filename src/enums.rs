//! Enumeration extraction and enum value tables.
//!
//! Schemas declare enum values either as a bare name (`1: credit_update`) or
//! as an object (`1: { id: credit_update, doc: "..." }`). Both forms are
//! normalized into [`EnumValue`] and sorted by numeric value.

use serde::Serialize;
use serde_yaml::Value;

use crate::error::ParseError;
use crate::report::DocumentSection;
use crate::utils::{format_hex, scalar_to_string, to_title_case, value_to_i64};

/// One value of an enumeration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValue {
    pub numeric_value: i64,
    pub symbolic_id: String,
    pub doc: String,
}

/// An enumeration with its values ordered by numeric value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDef {
    pub name: String,
    pub values: Vec<EnumValue>,
}

impl EnumDef {
    pub fn lookup(&self, numeric_value: i64) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.numeric_value == numeric_value)
    }
}

/// The two shapes an enum value may be written in
enum RawEnumValue<'a> {
    Bare(String),
    Structured {
        id: Option<&'a Value>,
        doc: Option<&'a Value>,
    },
}

impl<'a> RawEnumValue<'a> {
    fn from_value(value: &'a Value) -> Self {
        match value {
            Value::Mapping(map) => RawEnumValue::Structured {
                id: map.get("id"),
                doc: map.get("doc"),
            },
            other => RawEnumValue::Bare(scalar_to_string(other).unwrap_or_default()),
        }
    }

    fn normalize(self, numeric_value: i64, raw_key: &Value) -> EnumValue {
        match self {
            RawEnumValue::Bare(id) => EnumValue {
                numeric_value,
                symbolic_id: id,
                doc: String::new(),
            },
            RawEnumValue::Structured { id, doc } => EnumValue {
                numeric_value,
                symbolic_id: id
                    .and_then(scalar_to_string)
                    .or_else(|| scalar_to_string(raw_key))
                    .unwrap_or_default(),
                doc: doc.and_then(scalar_to_string).unwrap_or_default(),
            },
        }
    }
}

/// Extract every enumeration from a parsed schema document.
///
/// Returns an empty list when the document has no `enums` namespace.
pub fn extract_enums(document: &Value) -> Result<Vec<EnumDef>, ParseError> {
    match document.get("enums") {
        Some(namespace) => extract_enum_namespace(namespace),
        None => Ok(Vec::new()),
    }
}

/// Normalize the value of an `enums` namespace
pub(crate) fn extract_enum_namespace(namespace: &Value) -> Result<Vec<EnumDef>, ParseError> {
    let map = match namespace {
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(map) => map,
        _ => {
            return Err(ParseError::MalformedInput(
                "'enums' must be a mapping of enum names".to_string(),
            ))
        }
    };

    let mut enums = Vec::with_capacity(map.len());
    for (name, values) in map {
        let name = scalar_to_string(name).unwrap_or_default();
        let mut parsed = Vec::new();

        match values {
            Value::Null => {}
            Value::Mapping(values) => {
                for (key, value_def) in values {
                    let numeric_value = value_to_i64(key).ok_or_else(|| {
                        ParseError::MalformedInput(format!(
                            "enum '{}' has non-integer value key {:?}",
                            name, key
                        ))
                    })?;
                    parsed.push(RawEnumValue::from_value(value_def).normalize(numeric_value, key));
                }
            }
            _ => {
                return Err(ParseError::MalformedInput(format!(
                    "enum '{}' must be a mapping of values",
                    name
                )))
            }
        }

        // Stable: duplicate values keep declaration order
        parsed.sort_by_key(|v| v.numeric_value);
        enums.push(EnumDef { name, values: parsed });
    }

    Ok(enums)
}

/// Build the value table for one enumeration
///
/// The title is the enum name in Title Case with a " Values" suffix,
/// prefixed by `title_prefix` when given.
pub fn generate_enum_table(enum_def: &EnumDef, title_prefix: Option<&str>) -> DocumentSection {
    let title = format!(
        "{}{} Values",
        title_prefix.unwrap_or(""),
        to_title_case(&enum_def.name)
    );

    let rows = enum_def
        .values
        .iter()
        .map(|v| vec![format_hex(v.numeric_value), v.symbolic_id.clone(), v.doc.clone()])
        .collect();

    DocumentSection::Table {
        title,
        headers: vec!["Value".to_string(), "Name".to_string(), "Description".to_string()],
        rows,
    }
}

/// Value tables for every enumeration in a document
pub fn generate_enum_sections(
    document: &Value,
    title_prefix: Option<&str>,
) -> Result<Vec<DocumentSection>, ParseError> {
    Ok(extract_enums(document)?
        .iter()
        .map(|e| generate_enum_table(e, title_prefix))
        .collect())
}
