//! protodoc CLI - protocol definition reports from KSY schemas
//!
//! Parses `.ksy` protocol descriptions and writes the document sections
//! (field tables, enum tables, packet diagrams, state machines) that the
//! presentation and word-processing renderers consume.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

use protodoc::config::{ParseConfig, ReportConfig};
use protodoc::report::generate_header_section_with_width;
use protodoc::schema::schema_files;
use protodoc::serialization::{self, OutputFormat};
use protodoc::{PacketDiagram, ReportError};

#[derive(Parser)]
#[command(name = "protodoc")]
#[command(version, about = "Protocol definition reports from KSY schemas", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a document from every schema listed in protodoc.yaml
    Generate {
        /// Path to protodoc.yaml
        #[arg(short, long, default_value = "protodoc.yaml")]
        config: PathBuf,

        /// Override the output path from the config
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (yaml, json); inferred from the output extension by default
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Reject missing ids, unsized fields and dangling state references
        #[arg(short, long)]
        strict: bool,
    },

    /// Print the section list of one schema
    Sections {
        /// Schema file
        file: PathBuf,

        /// Output format (yaml, json, ndjson)
        #[arg(short, long, default_value = "yaml")]
        format: OutputFormat,

        /// Packet diagram width in bits
        #[arg(short, long, default_value = "32")]
        width: usize,
    },

    /// Print the packet diagram of one schema
    Diagram {
        /// Schema file
        file: PathBuf,

        /// Bits per row
        #[arg(short, long, default_value = "32")]
        width: usize,
    },

    /// Parse schemas without generating anything
    Validate {
        /// Schema files or directories of schemas
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Reject missing ids, unsized fields and dangling state references
        #[arg(short, long)]
        strict: bool,
    },
}

fn init_tracing(verbose: bool) {
    dotenv::dotenv().ok();

    let default_level = if verbose { "protodoc=debug" } else { "protodoc=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Generate { config, output, format, strict } => {
            generate(config, output, format, strict)
        }
        Commands::Sections { file, format, width } => {
            print_sections(file, format, width)
        }
        Commands::Diagram { file, width } => {
            print_diagram(file, width)
        }
        Commands::Validate { paths, strict } => {
            validate(paths, strict)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Build the configured document and write it to disk
fn generate(
    config_path: PathBuf,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    strict: bool,
) -> Result<(), ReportError> {
    println!("📋 Loading configuration from {}...", config_path.display());

    let mut config = ReportConfig::from_file(&config_path)?;
    if strict {
        config.parse = ParseConfig::strict();
    }
    config.validate()?;

    println!("  ✓ Document: {}", config.document.title);

    let document = config.build_document()?;
    for title in document.outline() {
        println!("  ✓ {}", title);
    }

    let output = output.unwrap_or_else(|| config.output_path());
    let format = format.unwrap_or_else(|| OutputFormat::from_path(&output));
    document.write_to(&output, format)?;

    println!(
        "✨ Wrote {} sections to {}",
        document.sections.len(),
        output.display()
    );

    Ok(())
}

fn print_sections(file: PathBuf, format: OutputFormat, width: usize) -> Result<(), ReportError> {
    let header = ParseConfig::default().load_schema(&file)?;
    let sections = generate_header_section_with_width(&header, width);

    let stdout = std::io::stdout();
    serialization::write_list(stdout.lock(), &sections, format)
}

fn print_diagram(file: PathBuf, width: usize) -> Result<(), ReportError> {
    let header = ParseConfig::default().load_schema(&file)?;
    println!("{}", PacketDiagram::with_width(&header, width).render());
    Ok(())
}

/// Parse every schema, reporting each failure, and fail if any did
fn validate(paths: Vec<PathBuf>, strict: bool) -> Result<(), ReportError> {
    let parse = if strict {
        ParseConfig::strict()
    } else {
        ParseConfig::default()
    };

    let files = expand_paths(&paths)?;
    println!("🔍 Validating {} schemas...", files.len());

    let mut failures = 0;
    for file in &files {
        match parse.load_schema(file) {
            Ok(header) => println!(
                "  ✓ {} ({} fields, {} bytes)",
                file.display(),
                header.fields.len(),
                header.size_bytes
            ),
            Err(e) => {
                failures += 1;
                println!("  ❌ {}", e);
            }
        }
    }

    if failures > 0 {
        return Err(ReportError::Validation(format!(
            "{} of {} schemas failed validation",
            failures,
            files.len()
        )));
    }

    println!("✅ All schemas are valid!");
    Ok(())
}

/// Directories expand to the schema files they contain
fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>, ReportError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(schema_files(path).map_err(|source| schema_error(path, source))?);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn schema_error(path: &Path, source: protodoc::ParseError) -> ReportError {
    ReportError::Schema {
        path: path.to_path_buf(),
        source,
    }
}
