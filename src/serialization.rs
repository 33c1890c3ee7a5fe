//! Writers for section lists and documents.
//!
//! YAML is what the document renderers read; JSON and NDJSON are offered for
//! tooling that prefers them.

use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use crate::error::ReportError;

/// Output encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
    /// One JSON object per line; only meaningful for lists
    Ndjson,
}

impl OutputFormat {
    /// Guess the format from a file extension, defaulting to YAML
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            "ndjson" | "jsonl" => Ok(OutputFormat::Ndjson),
            other => Err(format!(
                "Unsupported output format: '{}'. Supported formats: yaml, json, ndjson",
                other
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Yaml => write!(f, "yaml"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Ndjson => write!(f, "ndjson"),
        }
    }
}

/// Write a section list in the requested format. NDJSON writes one item per line.
pub fn write_list<T: Serialize, W: Write>(
    mut writer: W,
    items: &[T],
    format: OutputFormat,
) -> Result<(), ReportError> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_writer(&mut writer, items)?,
        OutputFormat::Json => serde_json::to_writer(&mut writer, items)?,
        OutputFormat::Ndjson => {
            for item in items {
                serde_json::to_writer(&mut writer, item)?;
                writeln!(writer)?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

/// Serialize a single value. NDJSON falls back to compact single-line JSON.
pub fn to_string<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, ReportError> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Ndjson => format!("{}\n", serde_json::to_string(value)?),
    })
}
