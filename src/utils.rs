//! Small text helpers shared by the parser and the report generators.

use convert_case::{Case, Casing};
use serde_yaml::Value;

/// Convert a snake_case identifier to Title Case ("cbfc_message_type" -> "Cbfc Message Type").
///
/// A letter right after a digit starts a new capitalized run, so "l2cap_type"
/// becomes "L2Cap Type".
pub fn to_title_case(s: &str) -> String {
    let words = s.from_case(Case::Snake).to_case(Case::Title);

    let mut after_digit = false;
    words
        .chars()
        .map(|c| {
            let out = if after_digit { c.to_ascii_uppercase() } else { c };
            after_digit = c.is_ascii_digit();
            out
        })
        .collect()
}

/// Format an integer as uppercase hex with at least two digits ("0x0A", "0x200")
pub fn format_hex(value: i64) -> String {
    if value < 0 {
        format!("-0x{:02X}", value.unsigned_abs())
    } else {
        format!("0x{:02X}", value)
    }
}

/// Keep at most `max_chars` characters, cutting on a char boundary
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// First line of a doc string, trimmed
pub fn first_line(doc: &str) -> String {
    doc.trim()
        .lines()
        .next()
        .map(|line| line.trim().to_string())
        .unwrap_or_default()
}

/// Render a YAML scalar as display text. Collections and null yield `None`.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Parse an integer from a YAML key: integers, or decimal/hex strings
pub fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) => i64::from_str_radix(hex, 16).ok(),
                None => s.parse().ok(),
            }
        }
        Value::Tagged(tagged) => value_to_i64(&tagged.value),
        _ => None,
    }
}
