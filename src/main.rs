//! Command-line interface for yang-datamodel

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use std::sync::Arc;
#[cfg(feature = "cli")]
use std::time::Instant;

#[cfg(feature = "cli")]
use yang_datamodel::{allow, DataModel, DataModelInstance, Element, SerializeOptions};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "yang-datamodel")]
#[command(author, version, about = "YANG data model inspection and configuration rendering tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// List every schema node of a data model with its kind
    Inspect {
        /// Path to the YIN-as-JSON schema export
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Slash separated statement names leading to the root container
        #[arg(short, long, default_value = "config/authority")]
        root: String,
    },

    /// Bind a configuration document and print it back as JSON
    Render {
        /// Path to the YIN-as-JSON schema export
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Path to the JSON configuration document
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Slash separated statement names leading to the root container
        #[arg(short, long, default_value = "config/authority")]
        root: String,

        /// Render camelCased member names
        #[arg(long)]
        camel_case: bool,

        /// Render leaf values as stored, without type conversion
        #[arg(long)]
        raw: bool,
    },
}

#[cfg(feature = "cli")]
fn main() {
    use tracing_subscriber::prelude::*;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yang_datamodel=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect { schema, root } => cmd_inspect(schema, root),
        Commands::Render {
            schema,
            config,
            root,
            camel_case,
            raw,
        } => cmd_render(schema, config, root, camel_case, raw),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn load_model(schema_path: &PathBuf, root: &str) -> Result<DataModel, Box<dyn std::error::Error>> {
    let started = Instant::now();

    let doc = Element::from_json_str(&fs::read_to_string(schema_path)?)?;
    let steps: Vec<&str> = root.split('/').filter(|s| !s.is_empty()).collect();
    let model = DataModel::from_element(&doc, |doc| doc.descend(&steps))?;

    tracing::info!(
        schema = %schema_path.display(),
        nodes = model.node_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "loaded data model"
    );

    Ok(model)
}

#[cfg(feature = "cli")]
fn cmd_inspect(schema_path: PathBuf, root: String) -> Result<(), Box<dyn std::error::Error>> {
    let model = load_model(&schema_path, &root)?;

    println!("yang-datamodel v{}", yang_datamodel::VERSION);
    println!();
    println!("Root: {}", model.root_name());
    println!("Nodes: {}", model.node_count());
    println!("Identity bases: {}", model.identities().len());
    println!();

    for (path, node) in model.registry() {
        let mut line = format!("  {} ({})", path, node.node_type().keyword());
        if !node.keys().is_empty() {
            line.push_str(&format!(" keys: {}", node.keys().join(", ")));
        }
        if let Some(t) = node.leaf_type() {
            line.push_str(&format!(" type: {}", t.name()));
        }
        println!("{}", line);
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_render(
    schema_path: PathBuf,
    config_path: PathBuf,
    root: String,
    camel_case: bool,
    raw: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let model = Arc::new(load_model(&schema_path, &root)?);

    let started = Instant::now();
    let config: serde_json::Value = serde_json::from_str(&fs::read_to_string(&config_path)?)?;
    let instance = DataModelInstance::new(model, &config)?;

    let options = SerializeOptions::new()
        .with_camel_case(camel_case)
        .with_convert(!raw);
    let rendered = instance.to_json(allow, &options, None);

    tracing::info!(
        config = %config_path.display(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "rendered configuration"
    );

    println!("{}", serde_json::to_string_pretty(&rendered)?);
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
