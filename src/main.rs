//! Command-line interface for xml2xsd

#[cfg(feature = "cli")]
use clap::{ArgAction, Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use xml2xsd::{
    check_instance, check_schema, detect_format, Converter, InferenceOptions, Limits, Schema,
    TypeScope, ValidationReport, XsdConverter,
};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xml2xsd")]
#[command(author, version, about = "Infer an XML Schema from a sample XML document", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an XSD schema from an XML document
    Convert {
        /// Path to the XML file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Type naming: global (one type per tag) or parent (per parent and tag)
        #[arg(short, long, default_value = "global")]
        scope: TypeScope,

        /// Use strict resource limits
        #[arg(long)]
        strict: bool,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the types inferred from an XML document
    Inspect {
        /// Path to the XML file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Type naming: global (one type per tag) or parent (per parent and tag)
        #[arg(short, long, default_value = "global")]
        scope: TypeScope,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Guess the format of a file
    Detect {
        /// Path to the file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Check a schema for dangling references, and optionally an instance against it
    Check {
        /// Path to the XSD schema file
        #[arg(short, long, value_name = "SCHEMA")]
        schema: PathBuf,

        /// Path to an XML instance to check
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            file,
            scope,
            strict,
            output,
        } => cmd_convert(file, scope, strict, output),
        Commands::Inspect { file, scope, json } => cmd_inspect(file, scope, json),
        Commands::Detect { file } => cmd_detect(file),
        Commands::Check { schema, file } => cmd_check(schema, file),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn converter(scope: TypeScope, strict: bool) -> XsdConverter {
    let limits = if strict { Limits::strict() } else { Limits::default() };
    XsdConverter::with_options(
        InferenceOptions::new()
            .with_limits(limits)
            .with_type_scope(scope),
    )
}

#[cfg(feature = "cli")]
fn cmd_convert(
    file: PathBuf,
    scope: TypeScope,
    strict: bool,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let xml_content = fs::read_to_string(&file)?;
    let xsd = converter(scope, strict).convert(&xml_content)?;

    if let Some(output_path) = output {
        fs::write(output_path, &xsd)?;
    } else {
        print!("{}", xsd);
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_inspect(file: PathBuf, scope: TypeScope, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let xml_content = fs::read_to_string(&file)?;
    let schema = converter(scope, false).infer(&xml_content)?;

    if json_output {
        print_schema_json(&schema)?;
    } else {
        print_schema_summary(&schema);
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_schema_summary(schema: &Schema) {
    let summary = schema.summary();

    println!("xml2xsd v{}", xml2xsd::VERSION);
    println!();
    println!("Schema Information:");
    println!("  Root Element: {}", summary.root_element);
    match &summary.target_namespace {
        Some(ns) => println!("  Target Namespace: {}", ns),
        None => println!("  Target Namespace: (none)"),
    }
    println!();
    println!("Statistics:");
    println!("  Element Types: {}", summary.element_types);
    println!("  Complex Types: {}", summary.complex_types);
    println!("  Mixed Types: {}", summary.mixed_types);
    println!("  Repeated Children: {}", summary.repeated_children);

    println!("\n=== Complex Types ===");
    for schema_type in schema.complex_types() {
        let mixed = if schema_type.is_mixed { ", mixed" } else { "" };
        println!("  {} ({}{})", schema_type.type_name, schema_type.name, mixed);
        for (name, child) in &schema_type.children {
            let child_type = schema.get(child.type_id);
            let type_str = match child_type.primitive_type {
                Some(primitive) if child_type.is_simple() => primitive.to_string(),
                _ => child_type.type_name.clone(),
            };
            println!("    {} : {} [{}..{}]", name, type_str, child.min_occurs, child.max_occurs);
        }
        for (name, primitive) in &schema_type.attributes {
            println!("    @{} : {}", name, primitive);
        }
    }
}

#[cfg(feature = "cli")]
fn print_schema_json(schema: &Schema) -> Result<(), Box<dyn std::error::Error>> {
    let output = serde_json::json!({
        "summary": schema.summary(),
        "schema": schema,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_detect(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let content = fs::read_to_string(&file)?;
    println!("{}", detect_format(&content));
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_check(schema_path: PathBuf, file: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let xsd = fs::read_to_string(&schema_path)?;

    let report = match file {
        Some(file) => check_instance(&fs::read_to_string(&file)?, &xsd),
        None => check_schema(&xsd),
    };
    print_report(&report);

    if report.is_valid() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn print_report(report: &ValidationReport) {
    if report.is_valid() {
        println!("✓ No problems found");
    } else {
        println!("✗ Problems found");
        println!();
        println!("Errors:");
        for error in &report.errors {
            println!("  - {}", error);
        }
    }
    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  - {}", warning);
        }
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
