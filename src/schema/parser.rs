//! KSY schema loader.
//!
//! Parses the YAML description of a protocol header into a [`SchemaHeader`].
//! Field sizes are resolved in this order:
//!
//! 1. fixed integer types (`u1`..`u8`, `s1`..`s8`)
//! 2. bit-width types (`b1`, `b12`, ...)
//! 3. an integer `size` attribute, in bytes
//! 4. zero, which is an error only under [`ParseOptions::strict_sizes`]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use crate::enums::extract_enum_namespace;
use crate::error::ParseError;
use crate::schema::types::{Field, Instance, PacketMetadata, ProtocolMetadata, SchemaHeader, SpecReference};
use crate::utils::{first_line, scalar_to_string};

/// Extension of schema files picked up by [`load_schemas`]
pub const SCHEMA_EXTENSION: &str = "ksy";

/// Largest byte count whose bit count still fits in a `u64`
const MAX_SIZE_BYTES: u64 = u64::MAX / 8;

/// Strictness switches. By default missing ids and unsized fields are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Reject schemas without a non-empty `meta.id`
    pub require_id: bool,
    /// Reject fields whose size cannot be determined instead of sizing them at zero bits
    pub strict_sizes: bool,
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self {
            require_id: true,
            strict_sizes: true,
        }
    }
}

/// Parse schema text with default (lenient) options
pub fn parse(source: &str) -> Result<SchemaHeader, ParseError> {
    parse_with_options(source, ParseOptions::default())
}

/// Parse schema text
pub fn parse_with_options(source: &str, options: ParseOptions) -> Result<SchemaHeader, ParseError> {
    let document: Value = serde_yaml::from_str(source)?;
    let root = document.as_mapping().ok_or_else(|| {
        ParseError::MalformedInput("expected a mapping at the document root".to_string())
    })?;

    let empty = Mapping::new();
    let meta = match root.get("meta") {
        None | Some(Value::Null) => &empty,
        Some(Value::Mapping(meta)) => meta,
        Some(_) => return Err(ParseError::MalformedInput("'meta' must be a mapping".to_string())),
    };

    let id = meta.get("id").and_then(scalar_to_string).unwrap_or_default();
    if options.require_id && id.is_empty() {
        return Err(ParseError::MissingId);
    }
    let title = meta.get("title").and_then(scalar_to_string).unwrap_or_default();

    let packet_metadata: Option<PacketMetadata> = namespace(root.get("x-packet"), "x-packet")?;
    let spec_reference: Option<SpecReference> = namespace(lookup_namespace(root, meta, "x-spec"), "x-spec")?;
    let protocol_metadata: Option<ProtocolMetadata> =
        namespace(lookup_namespace(root, meta, "x-protocol"), "x-protocol")?;

    let (fields, total_bits) = parse_fields(root.get("seq"), &id, options)?;

    let size_bytes = match packet_metadata.as_ref().and_then(|p| p.size_bytes) {
        Some(explicit) if explicit > MAX_SIZE_BYTES => {
            return Err(ParseError::MalformedInput(format!(
                "x-packet.size_bytes {} does not fit in a 64-bit bit count",
                explicit
            )))
        }
        Some(explicit) if explicit > 0 => explicit,
        _ => total_bits.div_ceil(8),
    };

    let enums = match root.get("enums") {
        Some(namespace) => extract_enum_namespace(namespace)?,
        None => Vec::new(),
    };

    let instances = root.get("instances").map(parse_instances).transpose()?;

    let doc = root.get("doc").and_then(scalar_to_string).unwrap_or_default();

    tracing::debug!(
        "Parsed schema '{}': {} fields, {} bytes, {} enums",
        id,
        fields.len(),
        size_bytes,
        enums.len()
    );

    Ok(SchemaHeader {
        id,
        title,
        size_bytes,
        fields,
        doc,
        spec_reference,
        packet_metadata,
        protocol_metadata,
        enums,
        instances,
    })
}

/// Read and parse a schema file
pub fn parse_file<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<SchemaHeader, ParseError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Loading schema {}", path.display());
    parse_with_options(&source, options)
}

/// Every `*.ksy` file in `dir`, sorted by file name
pub fn schema_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, ParseError> {
    let dir = dir.as_ref();
    let io_err = |source| ParseError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == SCHEMA_EXTENSION) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Parse every schema file in a directory.
///
/// Each file is parsed independently; the first failure aborts the load.
pub fn load_schemas<P: AsRef<Path>>(
    dir: P,
    options: ParseOptions,
) -> Result<Vec<(PathBuf, SchemaHeader)>, ParseError> {
    schema_files(dir)?
        .into_iter()
        .map(|path| {
            let header = parse_file(&path, options)?;
            Ok((path, header))
        })
        .collect()
}

/// Look a metadata namespace up at the root, then inside `meta`. No merging.
fn lookup_namespace<'a>(root: &'a Mapping, meta: &'a Mapping, key: &str) -> Option<&'a Value> {
    root.get(key).or_else(|| meta.get(key))
}

fn namespace<T: DeserializeOwned>(value: Option<&Value>, key: &str) -> Result<Option<T>, ParseError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_yaml::from_value(v.clone())
            .map(Some)
            .map_err(|e| ParseError::MalformedInput(format!("invalid '{}': {}", key, e))),
    }
}

/// Fields in declaration order, plus the total bit count
fn parse_fields(
    seq: Option<&Value>,
    schema_id: &str,
    options: ParseOptions,
) -> Result<(Vec<Field>, u64), ParseError> {
    let entries = match seq {
        None | Some(Value::Null) => return Ok((Vec::new(), 0)),
        Some(Value::Sequence(entries)) => entries,
        Some(_) => return Err(ParseError::MalformedInput("'seq' must be a list".to_string())),
    };

    let mut fields = Vec::with_capacity(entries.len());
    let mut offset_bits: u64 = 0;

    for (index, entry) in entries.iter().enumerate() {
        let def = entry.as_mapping().ok_or_else(|| {
            ParseError::MalformedInput(format!("seq entry {} must be a mapping", index))
        })?;

        let name = def.get("id").and_then(scalar_to_string).unwrap_or_default();
        let type_descriptor = def.get("type").and_then(scalar_to_string).unwrap_or_default();
        let size_bits = field_size_bits(&type_descriptor, def);

        if size_bits == 0 {
            if options.strict_sizes {
                return Err(ParseError::AmbiguousFieldSize {
                    field: name,
                    type_descriptor,
                });
            }
            tracing::warn!(
                "Field '{}' in '{}' has no known size (type '{}'); sizing it at 0 bits",
                name,
                schema_id,
                type_descriptor
            );
        }

        let doc = full_doc(def.get("doc"));

        fields.push(Field {
            description: first_line(&doc),
            doc,
            name,
            type_descriptor,
            size_bits,
            offset_bits,
            required: def.get("x-required").and_then(Value::as_bool),
            constraint_expression: def.get("x-constraint").and_then(scalar_to_string),
            spec_reference_note: def.get("x-spec-ref").and_then(scalar_to_string),
            enum_name: def.get("enum").and_then(scalar_to_string),
        });
        offset_bits = offset_bits.checked_add(size_bits).ok_or_else(|| {
            ParseError::MalformedInput(format!(
                "field offsets in '{}' overflow a 64-bit bit count at '{}'",
                schema_id,
                fields.last().map(|f| f.name.as_str()).unwrap_or_default()
            ))
        })?;
    }

    Ok((fields, offset_bits))
}

fn fixed_type_bits(type_descriptor: &str) -> Option<u64> {
    match type_descriptor {
        "u1" | "s1" => Some(8),
        "u2" | "s2" => Some(16),
        "u4" | "s4" => Some(32),
        "u8" | "s8" => Some(64),
        _ => None,
    }
}

fn bit_type_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^b([0-9]+)$").ok()).as_ref()
}

/// Size in bits of a `seq` entry, or zero when no rule applies.
///
/// A `size` whose bit count overflows a `u64` counts as unresolved.
pub fn field_size_bits(type_descriptor: &str, def: &Mapping) -> u64 {
    if let Some(bits) = fixed_type_bits(type_descriptor) {
        return bits;
    }
    if let Some(bits) = bit_type_re()
        .and_then(|re| re.captures(type_descriptor))
        .and_then(|caps| caps[1].parse::<u64>().ok())
    {
        return bits;
    }
    match def.get("size") {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|bytes| bytes.checked_mul(8))
            .unwrap_or(0),
        _ => 0,
    }
}

fn full_doc(doc: Option<&Value>) -> String {
    doc.and_then(scalar_to_string)
        .map(|d| d.trim().to_string())
        .unwrap_or_default()
}

fn parse_instances(value: &Value) -> Result<Vec<Instance>, ParseError> {
    let map = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(map) => map,
        _ => return Err(ParseError::MalformedInput("'instances' must be a mapping".to_string())),
    };

    map.iter()
        .map(|(name, def)| {
            let name = scalar_to_string(name).unwrap_or_default();
            let def = def.as_mapping().ok_or_else(|| {
                ParseError::MalformedInput(format!("instance '{}' must be a mapping", name))
            })?;
            Ok(Instance {
                value: def.get("value").and_then(scalar_to_string).unwrap_or_default(),
                description: first_line(&full_doc(def.get("doc"))),
                name,
            })
        })
        .collect()
}
