//! Report configuration schema for protodoc.yaml
//!
//! ```yaml
//! document:
//!   title: "Protocol Reference"
//!   subtitle: "Link layer messages"
//!   presenter:
//!     name: "Link Team"
//!     info: "Rev A"
//! schemas:
//!   directory: "schemas"
//!   files: ["extra/vc_state_machine.ksy"]
//! diagram:
//!   width_bits: 32
//! parse:
//!   require_id: false
//!   strict_sizes: false
//!   strict_state_machines: false
//! output: "protocol_report.yaml"
//! ```
//!
//! Relative paths are resolved against the directory holding the config file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::diagram::DEFAULT_WIDTH_BITS;
use crate::document::{Presenter, TechnicalDocument};
use crate::error::ReportError;
use crate::schema::{parse_file, schema_files, ParseOptions, SchemaHeader};
use crate::state_machine::extract_state_machine;

/// Top-level configuration from protodoc.yaml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub document: DocumentConfig,
    #[serde(default)]
    pub schemas: SchemaSources,
    #[serde(default)]
    pub diagram: DiagramConfig,
    #[serde(default)]
    pub parse: ParseConfig,
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Directory the config was loaded from
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub presenter: Option<Presenter>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: String::new(),
            presenter: None,
        }
    }
}

/// Where schema files come from
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SchemaSources {
    /// Every `*.ksy` in this directory, sorted by name
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Extra files, appended after the directory's files
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiagramConfig {
    #[serde(default = "default_width_bits")]
    pub width_bits: usize,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            width_bits: default_width_bits(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct ParseConfig {
    #[serde(default)]
    pub require_id: bool,
    #[serde(default)]
    pub strict_sizes: bool,
    /// Reject state machines whose transitions name undeclared states
    #[serde(default)]
    pub strict_state_machines: bool,
}

impl ParseConfig {
    pub fn options(&self) -> ParseOptions {
        ParseOptions {
            require_id: self.require_id,
            strict_sizes: self.strict_sizes,
        }
    }

    /// Every check switched on
    pub fn strict() -> Self {
        Self {
            require_id: true,
            strict_sizes: true,
            strict_state_machines: true,
        }
    }

    /// Parse one schema file under these settings
    pub fn load_schema(&self, path: &Path) -> Result<SchemaHeader, ReportError> {
        let schema_err = |source| ReportError::Schema {
            path: path.to_path_buf(),
            source,
        };

        let header = parse_file(path, self.options()).map_err(schema_err)?;
        if self.strict_state_machines {
            if let Some(sm) = extract_state_machine(header.protocol_metadata.as_ref()) {
                sm.validate().map_err(schema_err)?;
            }
        }
        Ok(header)
    }
}

fn default_title() -> String {
    "Protocol Reference".to_string()
}

fn default_width_bits() -> usize {
    DEFAULT_WIDTH_BITS
}

fn default_output() -> PathBuf {
    PathBuf::from("protocol_report.yaml")
}

impl ReportConfig {
    /// Load configuration from protodoc.yaml
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ReportError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_yaml(&contents)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ReportError> {
        serde_yaml::from_str(contents)
            .map_err(|e| ReportError::Config(format!("Failed to parse configuration: {}", e)))
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.diagram.width_bits == 0 {
            return Err(ReportError::Config(
                "diagram.width_bits must be greater than zero".to_string(),
            ));
        }
        if self.schemas.directory.is_none() && self.schemas.files.is_empty() {
            return Err(ReportError::Config(
                "schemas must name a directory or at least one file".to_string(),
            ));
        }
        if self.document.title.trim().is_empty() {
            return Err(ReportError::Config("document.title cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Resolve a config-relative path
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Directory schemas first, then explicit files
    pub fn schema_paths(&self) -> Result<Vec<PathBuf>, ReportError> {
        let mut paths = Vec::new();

        if let Some(dir) = &self.schemas.directory {
            let dir = self.resolve(dir);
            paths.extend(schema_files(&dir).map_err(|source| ReportError::Schema {
                path: dir.clone(),
                source,
            })?);
        }
        paths.extend(self.schemas.files.iter().map(|f| self.resolve(f)));

        Ok(paths)
    }

    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.output)
    }

    /// Empty document carrying the configured title block
    pub fn new_document(&self) -> TechnicalDocument {
        let mut doc = TechnicalDocument::new(self.document.title.clone())
            .with_subtitle(self.document.subtitle.clone());
        if let Some(presenter) = &self.document.presenter {
            doc = doc.with_presenter(presenter.clone());
        }
        doc
    }

    /// Parse every configured schema into one document
    pub fn build_document(&self) -> Result<TechnicalDocument, ReportError> {
        let mut doc = self.new_document();
        for path in self.schema_paths()? {
            let header = self.parse.load_schema(&path)?;
            tracing::info!(
                "Loaded {} ({} fields, {} bytes)",
                header.id,
                header.fields.len(),
                header.size_bytes
            );
            doc.add_header_with_width(&header, self.diagram.width_bits);
        }
        Ok(doc)
    }
}
