//! Multi-schema documents.
//!
//! A [`TechnicalDocument`] is the data file handed to the presentation and
//! word-processing renderers: a title block followed by the sections of every
//! schema, one header after another.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::diagram::DEFAULT_WIDTH_BITS;
use crate::error::ReportError;
use crate::fs_utils;
use crate::report::{generate_header_section_with_width, DocumentSection};
use crate::schema::SchemaHeader;
use crate::serialization::{self, OutputFormat};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Presenter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalDocument {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presenter: Option<Presenter>,
    #[serde(default)]
    pub sections: Vec<DocumentSection>,
}

impl TechnicalDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: String::new(),
            presenter: None,
            sections: Vec::new(),
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn with_presenter(mut self, presenter: Presenter) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// Append every section generated for `header`
    pub fn add_header(&mut self, header: &SchemaHeader) {
        self.add_header_with_width(header, DEFAULT_WIDTH_BITS);
    }

    pub fn add_header_with_width(&mut self, header: &SchemaHeader, width_bits: usize) {
        self.sections
            .extend(generate_header_section_with_width(header, width_bits));
    }

    /// Titles of the section headers, i.e. one entry per schema
    pub fn outline(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter_map(|s| match s {
                DocumentSection::SectionHeader { title, .. } => Some(title.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn to_string(&self, format: OutputFormat) -> Result<String, ReportError> {
        serialization::to_string(self, format)
    }

    /// Write the document, creating parent directories as needed
    pub fn write_to<P: AsRef<Path>>(&self, path: P, format: OutputFormat) -> Result<(), ReportError> {
        let contents = self.to_string(format)?;
        fs_utils::write_file(path.as_ref(), contents)?;
        tracing::info!(
            "Wrote {} sections to {}",
            self.sections.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    pub fn from_yaml(text: &str) -> Result<Self, ReportError> {
        Ok(serde_yaml::from_str(text)?)
    }
}
