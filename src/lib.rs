//! # Protodoc: Protocol Definition Reports
//!
//! Protodoc reads Kaitai-Struct-style (`.ksy`) descriptions of binary protocol
//! headers, extended with `x-` metadata namespaces, and renders them into an
//! ordered list of document sections: field tables, enum value tables, packet
//! layout diagrams and state machine tables.
//!
//! ## Pipeline
//!
//! ```text
//! YAML text -> schema::parse -> SchemaHeader -> report::generate_header_section -> Vec<DocumentSection>
//! ```
//!
//! ## Example schema
//!
//! ```yaml
//! meta:
//!   id: cbfc_cf_update
//!   title: CBFC CF_Update Control Ordered Set
//! x-spec:
//!   spec_version: "1.0.1"
//!   table: Table 5-20
//!   page: 492
//! seq:
//!   - id: control_char
//!     type: u1
//!     doc: Control character
//!     x-constraint: value == 0x5C
//!   - id: vc_index
//!     type: b5
//!     enum: vc_kind
//! enums:
//!   vc_kind:
//!     0: data
//!     1: { id: control, doc: Control traffic }
//! ```
//!
//! ## Example
//!
//! ```
//! use protodoc::{generate_header_section, parse};
//!
//! let header = parse("meta: {id: x, title: X}\nseq:\n  - {id: a, type: u1}\n").unwrap();
//! assert_eq!(header.size_bytes, 1);
//!
//! let sections = generate_header_section(&header);
//! assert_eq!(sections.len(), 3);
//! ```

// Core modules
pub mod error;
pub mod schema;
pub mod enums;
pub mod state_machine;
pub mod diagram;
pub mod report;

// Output and configuration
pub mod document;
pub mod serialization;
pub mod config;

pub mod utils;
pub mod fs_utils;

// Re-export key types
pub use error::{ParseError, ReportError};
pub use schema::{
    load_schemas, parse, parse_file, parse_with_options, Field, Instance, ParseOptions,
    SchemaHeader,
};
pub use enums::{extract_enums, generate_enum_table, EnumDef, EnumValue};
pub use state_machine::{
    extract_state_machine, generate_state_table, generate_transition_diagram,
    generate_transition_table, State, StateMachine, Transition,
};
pub use diagram::PacketDiagram;
pub use report::{generate_header_section, DocumentSection, ItemStyle};
pub use document::{Presenter, TechnicalDocument};
pub use serialization::OutputFormat;
pub use config::ReportConfig;
