//! Error types for schema parsing and report generation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning schema text into a [`SchemaHeader`](crate::SchemaHeader).
#[derive(Debug, Error)]
pub enum ParseError {
    /// The source text is not structured data, or its shape is unusable.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// `meta.id` is absent or empty and the caller asked for it.
    #[error("Schema is missing meta.id")]
    MissingId,

    /// A field type matched no size rule and carried no explicit size.
    #[error("Cannot determine size of field '{field}' (type '{type_descriptor}')")]
    AmbiguousFieldSize {
        field: String,
        type_descriptor: String,
    },

    /// A state machine names a state it never declares.
    #[error("State machine references undeclared state '{state}' ({context})")]
    UnresolvedState { state: String, context: String },

    /// Reading a schema file from disk failed.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<serde_yaml::Error> for ParseError {
    fn from(err: serde_yaml::Error) -> Self {
        ParseError::MalformedInput(err.to_string())
    }
}

/// Errors raised by configuration loading and document output.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to parse {path}: {source}")]
    Schema {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_messages() {
        let err = ParseError::AmbiguousFieldSize {
            field: "payload".to_string(),
            type_descriptor: "strz".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot determine size of field 'payload' (type 'strz')"
        );
        assert_eq!(ParseError::MissingId.to_string(), "Schema is missing meta.id");
    }

    #[test]
    fn test_yaml_error_becomes_malformed_input() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("a: [1, 2").unwrap_err();
        let err: ParseError = yaml_err.into();
        assert!(matches!(err, ParseError::MalformedInput(_)));
    }
}
