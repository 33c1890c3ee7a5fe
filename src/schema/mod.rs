//! Protocol schema model and KSY parser.

pub mod parser;
pub mod types;

pub use parser::{
    field_size_bits, load_schemas, parse, parse_file, parse_with_options, schema_files, ParseOptions,
    SCHEMA_EXTENSION,
};
pub use types::{
    Field, Instance, PacketMetadata, ProtocolMetadata, RelatedMessage, SchemaHeader, SpecReference,
    StateMachineSpec, StateSpec, TransitionSpec,
};
