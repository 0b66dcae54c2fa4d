//! Ingest Templates CLI - validate collection templates
//!
//! Commands: validate, kinds
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 when elements fail, 1 on fatal errors

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use ingest_templates_core::{
    CollectionContentTemplateFactory, CollectionTemplateFactory, ResolverConfig, ResolverError,
};

#[derive(Parser)]
#[command(name = "ingest-templates-cli")]
#[command(about = "Ingest Templates CLI - collection template resolver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a resolver config (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a CollectionContent template file
    Validate {
        /// Template file
        #[arg(short, long)]
        file: PathBuf,

        /// Report element errors as one aggregated failure
        #[arg(long)]
        strict: bool,
    },

    /// List candidate template kinds in dispatch order
    Kinds,
}

fn emit(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("failed to render output: {}", e),
    }
}

fn fatal(error: &ResolverError) -> ExitCode {
    emit(&json!({"valid": false, "error": error.to_string()}));
    ExitCode::FAILURE
}

fn read_input(path: &Path) -> Result<String, ResolverError> {
    fs::read_to_string(path).map_err(|source| ResolverError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ingest_templates_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.config.as_deref().map(ResolverConfig::from_file).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => return fatal(&e),
    };

    let factory = CollectionContentTemplateFactory::new().with_config(config);

    match cli.command {
        Commands::Kinds => {
            emit(&json!({"kinds": factory.kinds()}));
            ExitCode::SUCCESS
        }

        Commands::Validate { file, strict } => {
            let input = match read_input(&file) {
                Ok(input) => input,
                Err(e) => return fatal(&e),
            };
            tracing::info!(file = %file.display(), strict, "validating template");

            if strict {
                return match factory.create(&input) {
                    Ok(collection) => {
                        emit(&json!({"valid": true, "templateCount": collection.len(), "errors": []}));
                        ExitCode::SUCCESS
                    }
                    Err(e @ ResolverError::InvalidTemplate { .. }) => {
                        emit(&json!({"valid": false, "error": e.to_string()}));
                        ExitCode::from(2)
                    }
                    Err(e) => fatal(&e),
                };
            }

            match factory.create_lenient(&input) {
                Ok(outcome) => {
                    let valid = outcome.is_valid();
                    emit(&json!({
                        "valid": valid,
                        "templateCount": outcome.template.len(),
                        "errors": outcome.messages(),
                        "elementErrors": outcome.errors,
                    }));
                    if valid {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::from(2)
                    }
                }
                Err(e) => fatal(&e),
            }
        }
    }
}
